//! The scope: every world object the server currently reports as visible.
//!
//! Objects are keyed by their masked id. The wire id's high bit is a
//! transient "newly spawned" marker, so `raw | 0x8000` and `raw & 0x7FFF`
//! must land on the same entry; every lookup masks first.

use std::collections::HashMap;
use std::sync::RwLock;

/// Strip the spawn marker bit from a wire object id.
pub fn mask_id(raw: u16) -> u16 {
    raw & 0x7FFF
}

/// Object category, used for filtered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeObjectKind {
    Player,
    Npc,
    Monster,
    Item,
    Money,
}

impl std::fmt::Display for ScopeObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeObjectKind::Player => write!(f, "player"),
            ScopeObjectKind::Npc => write!(f, "npc"),
            ScopeObjectKind::Monster => write!(f, "monster"),
            ScopeObjectKind::Item => write!(f, "item"),
            ScopeObjectKind::Money => write!(f, "money"),
        }
    }
}

/// Kind-specific payload of a visible object.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeInfo {
    Player { name: String },
    Npc { type_number: u16, display_name: String },
    Monster { type_number: u16, display_name: String },
    Item { item_data: Vec<u8> },
    Money { amount: u32 },
}

/// One visible object. Both id forms are retained; only the masked one is
/// ever used as a key.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeObject {
    pub masked_id: u16,
    pub raw_id: u16,
    pub x: u8,
    pub y: u8,
    pub info: ScopeInfo,
}

impl ScopeObject {
    pub fn new(raw_id: u16, x: u8, y: u8, info: ScopeInfo) -> Self {
        Self {
            masked_id: mask_id(raw_id),
            raw_id,
            x,
            y,
            info,
        }
    }

    pub fn kind(&self) -> ScopeObjectKind {
        match self.info {
            ScopeInfo::Player { .. } => ScopeObjectKind::Player,
            ScopeInfo::Npc { .. } => ScopeObjectKind::Npc,
            ScopeInfo::Monster { .. } => ScopeObjectKind::Monster,
            ScopeInfo::Item { .. } => ScopeObjectKind::Item,
            ScopeInfo::Money { .. } => ScopeObjectKind::Money,
        }
    }

    /// Short description for listings and events.
    pub fn label(&self) -> String {
        match &self.info {
            ScopeInfo::Player { name } => name.clone(),
            ScopeInfo::Npc { display_name, type_number }
            | ScopeInfo::Monster { display_name, type_number } => {
                if display_name.is_empty() {
                    format!("#{type_number}")
                } else {
                    display_name.clone()
                }
            }
            ScopeInfo::Item { .. } => "item".into(),
            ScopeInfo::Money { amount } => format!("{amount} zen"),
        }
    }
}

/// Live map of visible objects. Single writer (the connection task), any
/// number of readers.
#[derive(Debug, Default)]
pub struct ScopeMap {
    objects: RwLock<HashMap<u16, ScopeObject>>,
}

impl ScopeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by masked id.
    pub fn add_or_update(&self, object: ScopeObject) {
        let mut objects = self.objects.write().expect("scope lock poisoned");
        objects.insert(object.masked_id, object);
    }

    /// Remove by id (masked internally). Returns whether an entry existed.
    pub fn remove(&self, id: u16) -> bool {
        let mut objects = self.objects.write().expect("scope lock poisoned");
        objects.remove(&mask_id(id)).is_some()
    }

    /// Move an object. Returns `false` for ids no longer in scope.
    pub fn update_position(&self, id: u16, x: u8, y: u8) -> bool {
        let mut objects = self.objects.write().expect("scope lock poisoned");
        match objects.get_mut(&mask_id(id)) {
            Some(object) => {
                object.x = x;
                object.y = y;
                true
            }
            None => false,
        }
    }

    /// Player or NPC display name for an id in either raw or masked form.
    pub fn find_name(&self, raw_id: u16) -> Option<String> {
        let objects = self.objects.read().expect("scope lock poisoned");
        objects.get(&mask_id(raw_id)).map(|object| object.label())
    }

    pub fn get(&self, id: u16) -> Option<ScopeObject> {
        let objects = self.objects.read().expect("scope lock poisoned");
        objects.get(&mask_id(id)).cloned()
    }

    pub fn contains(&self, id: u16) -> bool {
        let objects = self.objects.read().expect("scope lock poisoned");
        objects.contains_key(&mask_id(id))
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("scope lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.objects.write().expect("scope lock poisoned").clear();
    }

    /// Drop everything except the given id; used on map change, where the
    /// server re-reports everything but the self object may survive.
    pub fn clear_except(&self, keep_id: u16) {
        let keep = mask_id(keep_id);
        let mut objects = self.objects.write().expect("scope lock poisoned");
        objects.retain(|&id, _| id == keep);
    }

    /// Snapshot, optionally filtered by kind, ordered by masked id.
    pub fn snapshot(&self, kind: Option<ScopeObjectKind>) -> Vec<ScopeObject> {
        let objects = self.objects.read().expect("scope lock poisoned");
        let mut list: Vec<ScopeObject> = objects
            .values()
            .filter(|object| kind.map_or(true, |k| object.kind() == k))
            .cloned()
            .collect();
        list.sort_by_key(|object| object.masked_id);
        list
    }

    /// Closest dropped item or money pile by Chebyshev distance.
    pub fn nearest_pickup(&self, x: u8, y: u8) -> Option<ScopeObject> {
        let objects = self.objects.read().expect("scope lock poisoned");
        objects
            .values()
            .filter(|object| {
                matches!(
                    object.kind(),
                    ScopeObjectKind::Item | ScopeObjectKind::Money
                )
            })
            .min_by_key(|object| {
                let dx = object.x.abs_diff(x) as u16;
                let dy = object.y.abs_diff(y) as u16;
                (dx.max(dy), object.masked_id)
            })
            .cloned()
    }
}
