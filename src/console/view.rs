//! Rendering of events and read-only state views.

use std::fmt::Write as _;

use crate::common::events::ClientEvent;
use crate::data;
use crate::protocol::connect::packets::ServerListEntry;
use crate::protocol::game::item::{parse_item_details, SOCKET_EMPTY, SOCKET_NONE};
use crate::protocol::game::packets::CharacterPreview;
use crate::state::character::CharacterState;
use crate::state::scope::ScopeMap;

pub fn render_server_list(servers: &[ServerListEntry]) -> String {
    if servers.is_empty() {
        return "No game servers advertised".into();
    }
    let mut out = String::from("Game servers (connect <id>):");
    for server in servers {
        let _ = write!(out, "\n  [{:3}] load {:3}%", server.id, server.load);
    }
    out
}

pub fn render_character_list(characters: &[CharacterPreview]) -> String {
    if characters.is_empty() {
        return "No characters on this account".into();
    }
    let mut out = String::from("Characters (select <name>):");
    for character in characters {
        let _ = write!(
            out,
            "\n  {:10} level {:3}  {}",
            character.name,
            character.level,
            data::class_name(character.class)
        );
    }
    out
}

pub fn render_scope(scope: &ScopeMap) -> String {
    let objects = scope.snapshot(None);
    if objects.is_empty() {
        return "Nothing in scope".into();
    }
    let mut out = format!("{} object(s) in scope:", objects.len());
    for object in objects {
        let _ = write!(
            out,
            "\n  [{:04X}] {:7} {:20} ({:3},{:3})",
            object.masked_id,
            object.kind().to_string(),
            object.label(),
            object.x,
            object.y
        );
    }
    out
}

pub fn render_stats(state: &CharacterState) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{} ({}) level {} on {}",
        state.name,
        data::class_name(state.class),
        state.level,
        data::map_name(state.map_id)
    );
    let _ = write!(
        out,
        "\n  position ({}, {})  exp {}/{} ({:.1}%)",
        state.position_x,
        state.position_y,
        state.experience,
        state.exp_to_next,
        state.exp_percent()
    );
    let _ = write!(
        out,
        "\n  HP {}/{}  SD {}/{}  MP {}/{}  AG {}/{}",
        state.cur_hp,
        state.max_hp,
        state.cur_sd,
        state.max_sd,
        state.cur_mp,
        state.max_mp,
        state.cur_ag,
        state.max_ag
    );
    let _ = write!(
        out,
        "\n  str {}  agi {}  vit {}  ene {}  cmd {}  points {}",
        state.strength,
        state.agility,
        state.vitality,
        state.energy,
        state.leadership,
        state.level_points
    );
    if state.master_level > 0 {
        let _ = write!(
            out,
            "\n  master level {}  master points {}",
            state.master_level, state.master_level_points
        );
    }
    out
}

pub fn render_inventory(state: &CharacterState) -> String {
    let mut out = format!("Zen: {}", state.zen);
    if state.inventory.is_empty() {
        out.push_str("\nInventory is empty");
        return out;
    }
    let mut slots: Vec<_> = state.inventory.iter().collect();
    slots.sort_by_key(|(slot, _)| **slot);
    for (slot, item_data) in slots {
        match parse_item_details(item_data) {
            Some(details) => {
                let _ = write!(
                    out,
                    "\n  slot {:3}: +{} dur {}",
                    slot, details.plus_level, details.durability
                );
                if details.has_luck {
                    out.push_str(" +luck");
                }
                if details.has_skill {
                    out.push_str(" +skill");
                }
                if details.option_level > 0 {
                    let _ = write!(out, " +{}opt", details.option_value());
                }
                if details.excellent != 0 {
                    let _ = write!(out, " exc({:#04X})", details.excellent);
                }
                if details.ancient_set != 0 {
                    out.push_str(" ancient");
                }
                // A zeroed socket area means a non-socket item; declared
                // slots are either empty (0xFF) or hold an option.
                let slots = details
                    .sockets
                    .iter()
                    .filter(|&&s| s == SOCKET_EMPTY || (s != SOCKET_NONE && s != 0))
                    .count();
                if slots > 0 {
                    let filled = details
                        .sockets
                        .iter()
                        .filter(|&&s| s != SOCKET_NONE && s != SOCKET_EMPTY && s != 0)
                        .count();
                    let _ = write!(out, " soc {filled}/{slots}");
                }
            }
            None => {
                let _ = write!(out, "\n  slot {slot:3}: <malformed item data>");
            }
        }
    }
    out
}

pub fn render_skills(state: &CharacterState) -> String {
    if state.skills.is_empty() {
        return "No skills learned".into();
    }
    let mut skills: Vec<_> = state.skills.iter().collect();
    skills.sort_by_key(|(id, _)| **id);
    let mut out = format!("{} skill(s):", skills.len());
    for (id, entry) in skills {
        let _ = write!(out, "\n  skill {:4} level {}", id, entry.level);
        if let Some(display) = entry.display {
            let _ = write!(out, "  value {display:.1}");
        }
        if let Some(next) = entry.next_display {
            let _ = write!(out, "  next {next:.1}");
        }
    }
    out
}

/// One console line per event; `None` suppresses it (state-change ticks are
/// visible through the on-demand views instead).
pub fn describe_event(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::PhaseChanged(phase) => Some(format!("-- {phase}")),
        ClientEvent::ServerList(servers) => Some(render_server_list(servers)),
        ClientEvent::LoginSucceeded => Some("Login accepted".into()),
        ClientEvent::LoginFailed { code, reason } => {
            Some(format!("Login failed ({code:#04X}): {reason}"))
        }
        ClientEvent::CharacterList(characters) => Some(render_character_list(characters)),
        ClientEvent::EnteredGame { map_id, x, y } => Some(format!(
            "Entered {} at ({x}, {y})",
            data::map_name(*map_id)
        )),
        ClientEvent::MapChanged { map_id, x, y } => Some(format!(
            "Moved to {} ({x}, {y})",
            data::map_name(*map_id)
        )),
        ClientEvent::ScopeObjectAdded(summary) => Some(format!(
            "+ {} {} at ({}, {})",
            summary.kind, summary.label, summary.x, summary.y
        )),
        ClientEvent::ScopeObjectRemoved { masked_id } => {
            Some(format!("- object {masked_id:04X} out of scope"))
        }
        ClientEvent::CharacterStateChanged(_) => None,
        ClientEvent::MovementConfirmed { x, y } => Some(format!("Arrived at ({x}, {y})")),
        ClientEvent::MovementTimedOut => Some("Movement request timed out".into()),
        ClientEvent::Died { killer } => Some(match killer {
            Some(name) => format!("You were killed by {name}"),
            None => "You died".into(),
        }),
        ClientEvent::Notice(text) => Some(text.clone()),
        ClientEvent::Disconnected => Some("Disconnected".into()),
    }
}
