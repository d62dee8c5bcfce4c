//! Game Server packet definitions.
//!
//! Decoders borrow the routed payload and never copy more than the fields
//! they keep. Record layouts differ between protocol versions; every
//! version-sensitive decoder takes the dialect chosen at startup.

use bytes::{Buf, Bytes};

use crate::common::error::ProtocolResult;
use crate::protocol::packets::codes::game;
use crate::protocol::packets::{read_fixed_string, require};
use crate::protocol::ProtocolVersion;

// ============================================================================
// Session
// ============================================================================

/// LoginResponse result codes.
pub const LOGIN_OK: u8 = 0x01;

/// Human-readable login failure reason.
pub fn login_failure_reason(code: u8) -> &'static str {
    match code {
        0x00 => "password incorrect",
        0x02 => "account already connected",
        0x03 => "server is full",
        0x04 => "account is blocked",
        0x05 => "wrong client version",
        0x06 => "connection error",
        _ => "unknown failure",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginResponse {
    pub result: u8,
}

impl LoginResponse {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 1)?;
        Ok(Self {
            result: buf.get_u8(),
        })
    }

    pub fn succeeded(&self) -> bool {
        self.result == LOGIN_OK
    }
}

// ============================================================================
// Character selection
// ============================================================================

/// One entry of the character list shown at selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterPreview {
    pub slot: u8,
    pub name: String,
    pub level: u16,
    pub class: u8,
    pub status: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterList {
    pub characters: Vec<CharacterPreview>,
}

impl CharacterList {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        let mut characters = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 1)?;
            let slot = buf.get_u8();
            let name = read_fixed_string(buf, 10)?;
            require(buf, 4)?;
            let level = buf.get_u16();
            let class = buf.get_u8();
            let status = buf.get_u8();
            characters.push(CharacterPreview {
                slot,
                name,
                level,
                class,
                status,
            });
        }
        Ok(Self { characters })
    }
}

/// CharacterInformation: the self-state snapshot that puts the client in
/// game. Older dialects lack shield/ability vitals (0.97) and leadership
/// (0.75) and carry 32-bit experience counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterInformation {
    pub x: u8,
    pub y: u8,
    pub map_id: u16,
    pub experience: u64,
    pub exp_to_next: u64,
    pub level_points: u16,
    pub strength: u16,
    pub agility: u16,
    pub vitality: u16,
    pub energy: u16,
    pub leadership: u16,
    pub cur_hp: u16,
    pub max_hp: u16,
    pub cur_mp: u16,
    pub max_mp: u16,
    pub cur_sd: u16,
    pub max_sd: u16,
    pub cur_ag: u16,
    pub max_ag: u16,
    pub zen: u32,
    pub hero_state: u8,
    pub status: u8,
    pub class: u8,
    pub level: u16,
    pub expansion_state: u8,
}

impl CharacterInformation {
    pub fn decode(buf: &mut Bytes, version: ProtocolVersion) -> ProtocolResult<Self> {
        require(buf, 4)?;
        let x = buf.get_u8();
        let y = buf.get_u8();
        let map_id = buf.get_u16();

        let (experience, exp_to_next) = match version {
            ProtocolVersion::Season6 => {
                require(buf, 16)?;
                (buf.get_u64(), buf.get_u64())
            }
            ProtocolVersion::Version097 | ProtocolVersion::Version075 => {
                require(buf, 8)?;
                (buf.get_u32() as u64, buf.get_u32() as u64)
            }
        };

        require(buf, 10)?;
        let level_points = buf.get_u16();
        let strength = buf.get_u16();
        let agility = buf.get_u16();
        let vitality = buf.get_u16();
        let energy = buf.get_u16();
        let leadership = if version == ProtocolVersion::Version075 {
            0
        } else {
            require(buf, 2)?;
            buf.get_u16()
        };

        require(buf, 8)?;
        let cur_hp = buf.get_u16();
        let max_hp = buf.get_u16();
        let cur_mp = buf.get_u16();
        let max_mp = buf.get_u16();

        let (cur_sd, max_sd, cur_ag, max_ag) = if version == ProtocolVersion::Season6 {
            require(buf, 8)?;
            (buf.get_u16(), buf.get_u16(), buf.get_u16(), buf.get_u16())
        } else {
            (0, 1, 0, 1)
        };

        require(buf, 9)?;
        let zen = buf.get_u32();
        let hero_state = buf.get_u8();
        let status = buf.get_u8();
        let class = buf.get_u8();
        let level = buf.get_u16();

        let expansion_state = if version == ProtocolVersion::Season6 {
            require(buf, 1)?;
            buf.get_u8()
        } else {
            0
        };

        Ok(Self {
            x,
            y,
            map_id,
            experience,
            exp_to_next,
            level_points,
            strength,
            agility,
            vitality,
            energy,
            leadership,
            cur_hp,
            max_hp,
            cur_mp,
            max_mp,
            cur_sd,
            max_sd,
            cur_ag,
            max_ag,
            zen,
            hero_state,
            status,
            class,
            level,
            expansion_state,
        })
    }
}

// ============================================================================
// Map and movement
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapChanged {
    pub map_id: u16,
    pub x: u8,
    pub y: u8,
    pub rotation: u8,
}

impl MapChanged {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 5)?;
        Ok(Self {
            map_id: buf.get_u16(),
            x: buf.get_u8(),
            y: buf.get_u8(),
            rotation: buf.get_u8(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMoved {
    pub raw_id: u16,
    pub x: u8,
    pub y: u8,
}

impl ObjectMoved {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 4)?;
        Ok(Self {
            raw_id: buf.get_u16(),
            x: buf.get_u8(),
            y: buf.get_u8(),
        })
    }
}

/// A walk report: target cell, initial rotation and the step count. A step
/// count of zero is a walk terminator (stop or rotate in place). The packed
/// step nibbles that follow are consumed but not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectWalked {
    pub raw_id: u16,
    pub x: u8,
    pub y: u8,
    pub rotation: u8,
    pub step_count: u8,
}

impl ObjectWalked {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 5)?;
        let raw_id = buf.get_u16();
        let x = buf.get_u8();
        let y = buf.get_u8();
        let packed = buf.get_u8();
        let rotation = packed >> 4;
        let step_count = packed & 0x0F;
        let step_bytes = (step_count as usize).div_ceil(2);
        require(buf, step_bytes)?;
        buf.advance(step_bytes);
        Ok(Self {
            raw_id,
            x,
            y,
            rotation,
            step_count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectKilled {
    pub victim_raw_id: u16,
    pub killer_raw_id: u16,
}

impl ObjectKilled {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 4)?;
        Ok(Self {
            victim_raw_id: buf.get_u16(),
            killer_raw_id: buf.get_u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectAnimation {
    pub raw_id: u16,
    pub rotation: u8,
    pub animation: u8,
}

impl ObjectAnimation {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 4)?;
        Ok(Self {
            raw_id: buf.get_u16(),
            rotation: buf.get_u8(),
            animation: buf.get_u8(),
        })
    }
}

/// Removal lists (MapObjectOutOfScope, ItemDropRemoved): count byte followed
/// by big-endian ids.
pub fn decode_id_list(buf: &mut Bytes) -> ProtocolResult<Vec<u16>> {
    require(buf, 1)?;
    let count = buf.get_u8() as usize;
    require(buf, count * 2)?;
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(buf.get_u16());
    }
    Ok(ids)
}

// ============================================================================
// Scope additions
// ============================================================================

/// One player record from AddCharactersToScope. The appearance blob and
/// effect list are version-dependent filler here; only position, identity
/// and hero state survive decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCharacter {
    pub raw_id: u16,
    pub x: u8,
    pub y: u8,
    pub hero_state: u8,
    pub name: String,
}

impl ScopeCharacter {
    pub fn decode_many(buf: &mut Bytes, version: ProtocolVersion) -> ProtocolResult<Vec<Self>> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 4)?;
            let raw_id = buf.get_u16();
            let x = buf.get_u8();
            let y = buf.get_u8();
            let hero_state = match version {
                ProtocolVersion::Season6 => {
                    require(buf, 19)?;
                    buf.advance(18);
                    let hero_state = buf.get_u8();
                    require(buf, 1)?;
                    let effects = buf.get_u8() as usize;
                    require(buf, effects)?;
                    buf.advance(effects);
                    hero_state
                }
                ProtocolVersion::Version097 => {
                    require(buf, 14)?;
                    buf.advance(13);
                    buf.get_u8()
                }
                ProtocolVersion::Version075 => {
                    require(buf, 9)?;
                    buf.advance(9);
                    0
                }
            };
            let name = read_fixed_string(buf, 10)?;
            records.push(Self {
                raw_id,
                x,
                y,
                hero_state,
                name,
            });
        }
        Ok(records)
    }
}

/// One NPC or monster record from AddNpcsToScope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeNpc {
    pub raw_id: u16,
    pub type_number: u16,
    pub x: u8,
    pub y: u8,
}

impl ScopeNpc {
    pub fn decode_many(buf: &mut Bytes, version: ProtocolVersion) -> ProtocolResult<Vec<Self>> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 2)?;
            let raw_id = buf.get_u16();
            let type_number = match version {
                ProtocolVersion::Version075 => {
                    require(buf, 1)?;
                    buf.get_u8() as u16
                }
                _ => {
                    require(buf, 2)?;
                    buf.get_u16()
                }
            };
            require(buf, 2)?;
            let x = buf.get_u8();
            let y = buf.get_u8();
            match version {
                ProtocolVersion::Season6 => {
                    require(buf, 2)?;
                    buf.advance(1); // rotation
                    let effects = buf.get_u8() as usize;
                    require(buf, effects)?;
                    buf.advance(effects);
                }
                ProtocolVersion::Version097 => {
                    require(buf, 1)?;
                    buf.advance(1); // rotation
                }
                ProtocolVersion::Version075 => {}
            }
            records.push(Self {
                raw_id,
                type_number,
                x,
                y,
            });
        }
        Ok(records)
    }
}

// ============================================================================
// Drops
// ============================================================================

/// A dropped stack is money when the item group byte is 15 and the high
/// nibble of byte five reads 14. The amount sits in bytes one to four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Item,
    Money(u32),
}

pub fn classify_drop(item_data: &[u8]) -> DropKind {
    if item_data.len() >= 6 && item_data[0] == 15 && (item_data[5] >> 4) == 14 {
        let amount = u32::from_be_bytes([item_data[1], item_data[2], item_data[3], item_data[4]]);
        DropKind::Money(amount)
    } else {
        DropKind::Item
    }
}

/// One record from ItemsDropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedObject {
    pub raw_id: u16,
    pub x: u8,
    pub y: u8,
    pub item_data: Vec<u8>,
}

impl DroppedObject {
    pub fn decode_many(buf: &mut Bytes, version: ProtocolVersion) -> ProtocolResult<Vec<Self>> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        let item_len = version.item_data_len();
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 4 + item_len)?;
            let raw_id = buf.get_u16();
            let x = buf.get_u8();
            let y = buf.get_u8();
            let mut item_data = vec![0u8; item_len];
            buf.copy_to_slice(&mut item_data);
            records.push(Self {
                raw_id,
                x,
                y,
                item_data,
            });
        }
        Ok(records)
    }
}

/// MoneyDroppedExtended: always money, with a full 32-bit amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyDrop {
    pub raw_id: u16,
    pub amount: u32,
    pub x: u8,
    pub y: u8,
}

impl MoneyDrop {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 8)?;
        Ok(Self {
            raw_id: buf.get_u16(),
            amount: buf.get_u32(),
            x: buf.get_u8(),
            y: buf.get_u8(),
        })
    }
}

// ============================================================================
// Vitals and progression
// ============================================================================

/// HealthShield and ManaAbility updates share this two-value shape; the
/// sub-code picks current versus maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VitalsUpdate {
    pub first: u16,
    pub second: u16,
}

impl VitalsUpdate {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 4)?;
        Ok(Self {
            first: buf.get_u16(),
            second: buf.get_u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGained {
    pub killed_raw_id: u16,
    pub amount: u32,
    pub damage: u16,
}

impl ExperienceGained {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 8)?;
        Ok(Self {
            killed_raw_id: buf.get_u16(),
            amount: buf.get_u32(),
            damage: buf.get_u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpdate {
    pub level: u16,
    pub level_points: u16,
    pub exp_to_next: u64,
    pub max_hp: u16,
    pub max_mp: u16,
    pub max_sd: u16,
    pub max_ag: u16,
}

impl LevelUpdate {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 20)?;
        Ok(Self {
            level: buf.get_u16(),
            level_points: buf.get_u16(),
            exp_to_next: buf.get_u64(),
            max_hp: buf.get_u16(),
            max_mp: buf.get_u16(),
            max_sd: buf.get_u16(),
            max_ag: buf.get_u16(),
        })
    }
}

/// Attribute ids used by StatIncreaseResponse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatAttribute {
    Strength,
    Agility,
    Vitality,
    Energy,
    Leadership,
}

impl StatAttribute {
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Strength),
            1 => Some(Self::Agility),
            2 => Some(Self::Vitality),
            3 => Some(Self::Energy),
            4 => Some(Self::Leadership),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatIncreaseResponse {
    pub success: bool,
    pub attribute: u8,
}

impl StatIncreaseResponse {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 2)?;
        Ok(Self {
            success: buf.get_u8() != 0,
            attribute: buf.get_u8(),
        })
    }
}

// ============================================================================
// Master level
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MasterSkillEntry {
    pub skill_id: u16,
    pub level: u8,
    pub display: f32,
    pub next_display: f32,
}

impl MasterSkillEntry {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 11)?;
        Ok(Self {
            skill_id: buf.get_u16(),
            level: buf.get_u8(),
            display: buf.get_f32(),
            next_display: buf.get_f32(),
        })
    }

    pub fn decode_many(buf: &mut Bytes) -> ProtocolResult<Vec<Self>> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(Self::decode(buf)?);
        }
        Ok(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterStatsUpdate {
    pub master_level: u16,
    pub master_experience: u64,
    pub master_exp_to_next: u64,
    pub master_level_points: u16,
}

impl MasterStatsUpdate {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 20)?;
        Ok(Self {
            master_level: buf.get_u16(),
            master_experience: buf.get_u64(),
            master_exp_to_next: buf.get_u64(),
            master_level_points: buf.get_u16(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterLevelUpdate {
    pub master_level: u16,
    pub master_level_points: u16,
    pub master_exp_to_next: u64,
}

impl MasterLevelUpdate {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 12)?;
        Ok(Self {
            master_level: buf.get_u16(),
            master_level_points: buf.get_u16(),
            master_exp_to_next: buf.get_u64(),
        })
    }
}

// ============================================================================
// Skills and inventory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillList {
    pub skills: Vec<(u16, u8)>,
}

impl SkillList {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        require(buf, count * 3)?;
        let mut skills = Vec::with_capacity(count);
        for _ in 0..count {
            let id = buf.get_u16();
            let level = buf.get_u8();
            skills.push((id, level));
        }
        Ok(Self { skills })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryList {
    pub expansion_state: u8,
    pub items: Vec<(u8, Vec<u8>)>,
}

impl InventoryList {
    pub fn decode(buf: &mut Bytes, version: ProtocolVersion) -> ProtocolResult<Self> {
        require(buf, 2)?;
        let expansion_state = buf.get_u8();
        let count = buf.get_u8() as usize;
        let item_len = version.item_data_len();
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 1 + item_len)?;
            let slot = buf.get_u8();
            let mut data = vec![0u8; item_len];
            buf.copy_to_slice(&mut data);
            items.push((slot, data));
        }
        Ok(Self {
            expansion_state,
            items,
        })
    }
}

/// ItemAddedToInventory uses slot sentinels: 0xFE carries a zen amount and
/// 0xFF signals a failed pickup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryAddition {
    Item { slot: u8, item_data: Vec<u8> },
    Money { amount: u32 },
    Failed,
}

impl InventoryAddition {
    pub fn decode(buf: &mut Bytes, version: ProtocolVersion) -> ProtocolResult<Self> {
        require(buf, 1)?;
        let slot = buf.get_u8();
        match slot {
            game::SLOT_PICKUP_FAILED => Ok(Self::Failed),
            game::SLOT_MONEY => {
                require(buf, 4)?;
                Ok(Self::Money {
                    amount: buf.get_u32(),
                })
            }
            _ => {
                let item_len = version.item_data_len();
                require(buf, item_len)?;
                let mut item_data = vec![0u8; item_len];
                buf.copy_to_slice(&mut item_data);
                Ok(Self::Item { slot, item_data })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRemoved {
    pub slot: u8,
}

impl ItemRemoved {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 1)?;
        Ok(Self {
            slot: buf.get_u8(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurabilityChange {
    pub slot: u8,
    pub durability: u8,
    pub by_consumption: bool,
}

impl DurabilityChange {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 3)?;
        Ok(Self {
            slot: buf.get_u8(),
            durability: buf.get_u8(),
            by_consumption: buf.get_u8() != 0,
        })
    }
}

// ============================================================================
// Guild
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildAssignment {
    pub raw_id: u16,
    pub guild_name: String,
    pub role: u8,
}

impl GuildAssignment {
    pub fn decode_many(buf: &mut Bytes) -> ProtocolResult<Vec<Self>> {
        require(buf, 1)?;
        let count = buf.get_u8() as usize;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 2)?;
            let raw_id = buf.get_u16();
            let guild_name = read_fixed_string(buf, 8)?;
            require(buf, 1)?;
            let role = buf.get_u8();
            entries.push(Self {
                raw_id,
                guild_name,
                role,
            });
        }
        Ok(entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuildMemberLeft {
    pub raw_id: u16,
}

impl GuildMemberLeft {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 2)?;
        Ok(Self {
            raw_id: buf.get_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn character_list_decodes_records() {
        let mut raw = BytesMut::new();
        raw.extend_from_slice(&[2]);
        raw.extend_from_slice(&[0]);
        raw.extend_from_slice(b"Gandalf\0\0\0");
        raw.extend_from_slice(&[0x01, 0x90, 0x11, 0x00]); // level 400, blade knight
        raw.extend_from_slice(&[1]);
        raw.extend_from_slice(b"Radagast\0\0");
        raw.extend_from_slice(&[0x00, 0x06, 0x00, 0x00]);
        let mut buf = raw.freeze();

        let list = CharacterList::decode(&mut buf).unwrap();
        assert_eq!(list.characters.len(), 2);
        assert_eq!(list.characters[0].name, "Gandalf");
        assert_eq!(list.characters[0].level, 400);
        assert_eq!(list.characters[1].name, "Radagast");
        assert_eq!(list.characters[1].level, 6);
    }

    fn season6_character_info() -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[125, 201]); // x, y
        raw.extend_from_slice(&0u16.to_be_bytes()); // Lorencia
        raw.extend_from_slice(&3_000_000u64.to_be_bytes());
        raw.extend_from_slice(&4_500_000u64.to_be_bytes());
        raw.extend_from_slice(&12u16.to_be_bytes()); // level points
        for stat in [85u16, 60, 40, 30, 0] {
            raw.extend_from_slice(&stat.to_be_bytes());
        }
        for vital in [450u16, 500, 200, 220, 95, 100, 40, 50] {
            raw.extend_from_slice(&vital.to_be_bytes());
        }
        raw.extend_from_slice(&75_000u32.to_be_bytes());
        raw.extend_from_slice(&[0, 0, 16]); // hero, status, class
        raw.extend_from_slice(&92u16.to_be_bytes());
        raw.push(1); // expansion
        raw
    }

    #[test]
    fn character_information_decodes_season6_layout() {
        let mut buf = Bytes::from(season6_character_info());
        let info = CharacterInformation::decode(&mut buf, ProtocolVersion::Season6).unwrap();
        assert_eq!((info.x, info.y), (125, 201));
        assert_eq!(info.experience, 3_000_000);
        assert_eq!(info.max_sd, 220);
        assert_eq!(info.zen, 75_000);
        assert_eq!(info.level, 92);
        assert_eq!(info.expansion_state, 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn character_information_decodes_legacy_layout() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[10, 20]);
        raw.extend_from_slice(&2u16.to_be_bytes()); // Devias
        raw.extend_from_slice(&100_000u32.to_be_bytes());
        raw.extend_from_slice(&150_000u32.to_be_bytes());
        raw.extend_from_slice(&5u16.to_be_bytes());
        for stat in [40u16, 35, 30, 25] {
            raw.extend_from_slice(&stat.to_be_bytes());
        }
        for vital in [120u16, 130, 60, 70] {
            raw.extend_from_slice(&vital.to_be_bytes());
        }
        raw.extend_from_slice(&9_999u32.to_be_bytes());
        raw.extend_from_slice(&[0, 0, 0]);
        raw.extend_from_slice(&30u16.to_be_bytes());

        let mut buf = Bytes::from(raw);
        let info = CharacterInformation::decode(&mut buf, ProtocolVersion::Version075).unwrap();
        assert_eq!(info.experience, 100_000);
        assert_eq!(info.leadership, 0);
        // Missing shield/ability vitals fall back to safe denominators.
        assert_eq!((info.cur_sd, info.max_sd), (0, 1));
        assert_eq!((info.cur_ag, info.max_ag), (0, 1));
        assert!(buf.is_empty());
    }

    #[test]
    fn scope_characters_skip_appearance_and_effects() {
        let mut raw = Vec::new();
        raw.push(1);
        raw.extend_from_slice(&0x8001u16.to_be_bytes());
        raw.extend_from_slice(&[100, 120]);
        raw.extend_from_slice(&[0u8; 18]); // appearance
        raw.push(2); // hero state
        raw.push(3); // effect count
        raw.extend_from_slice(&[9, 9, 9]);
        raw.extend_from_slice(b"Self\0\0\0\0\0\0");

        let mut buf = Bytes::from(raw);
        let records = ScopeCharacter::decode_many(&mut buf, ProtocolVersion::Season6).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_id, 0x8001);
        assert_eq!(records[0].hero_state, 2);
        assert_eq!(records[0].name, "Self");
        assert!(buf.is_empty());
    }

    #[test]
    fn legacy_npc_records_use_byte_type_numbers() {
        let mut raw = Vec::new();
        raw.push(2);
        raw.extend_from_slice(&0x0102u16.to_be_bytes());
        raw.extend_from_slice(&[3, 140, 121]); // Spider
        raw.extend_from_slice(&0x0103u16.to_be_bytes());
        raw.extend_from_slice(&[7, 15, 15]); // Giant
        let mut buf = Bytes::from(raw);
        let records = ScopeNpc::decode_many(&mut buf, ProtocolVersion::Version075).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].type_number, 3);
        assert_eq!(records[1].type_number, 7);
    }

    #[test]
    fn walked_packet_consumes_packed_steps() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&0x0001u16.to_be_bytes());
        raw.extend_from_slice(&[50, 60]);
        raw.push((3 << 4) | 5); // rotation 3, five steps
        raw.extend_from_slice(&[0x12, 0x34, 0x50]); // packed nibbles
        let mut buf = Bytes::from(raw);
        let walked = ObjectWalked::decode(&mut buf).unwrap();
        assert_eq!(walked.rotation, 3);
        assert_eq!(walked.step_count, 5);
        assert!(buf.is_empty());
    }

    #[test]
    fn walk_terminator_has_no_step_bytes() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&0x0001u16.to_be_bytes());
        raw.extend_from_slice(&[50, 60]);
        raw.push(2 << 4); // rotate only
        let mut buf = Bytes::from(raw);
        let walked = ObjectWalked::decode(&mut buf).unwrap();
        assert_eq!(walked.step_count, 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn money_sentinel_classifies_drops() {
        let money = [15, 0, 0, 0, 250, 0xE0, 0, 0, 0, 0, 0, 0];
        assert_eq!(classify_drop(&money), DropKind::Money(250));

        let mut item = money;
        item[5] = 0x20;
        assert_eq!(classify_drop(&item), DropKind::Item);
    }

    #[test]
    fn short_item_data_is_never_money() {
        assert_eq!(classify_drop(&[15, 0, 0, 0, 250]), DropKind::Item);
    }

    #[test]
    fn inventory_addition_decodes_sentinels() {
        let mut buf = Bytes::from_static(&[0xFE, 0x00, 0x00, 0x27, 0x10]);
        assert_eq!(
            InventoryAddition::decode(&mut buf, ProtocolVersion::Season6).unwrap(),
            InventoryAddition::Money { amount: 10_000 }
        );

        let mut buf = Bytes::from_static(&[0xFF]);
        assert_eq!(
            InventoryAddition::decode(&mut buf, ProtocolVersion::Season6).unwrap(),
            InventoryAddition::Failed
        );

        let mut raw = vec![3u8];
        raw.extend_from_slice(&[0u8; 12]);
        let mut buf = Bytes::from(raw);
        assert!(matches!(
            InventoryAddition::decode(&mut buf, ProtocolVersion::Season6).unwrap(),
            InventoryAddition::Item { slot: 3, .. }
        ));
    }

    #[test]
    fn truncated_drop_record_fails() {
        let mut raw = vec![1u8];
        raw.extend_from_slice(&0x1234u16.to_be_bytes());
        raw.extend_from_slice(&[10, 10, 15, 0]); // item data cut short
        let mut buf = Bytes::from(raw);
        assert!(DroppedObject::decode_many(&mut buf, ProtocolVersion::Season6).is_err());
    }
}
