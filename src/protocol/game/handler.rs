//! Game Server packet handling.
//!
//! All handlers run on the connection task, so character-state and scope
//! writes serialize without extra coordination. Handlers never talk to the
//! socket directly; outbound replies are queued on the context and flushed
//! by the connection loop after dispatch.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::client::movement::MovementTicket;
use crate::client::phase::ConnectionPhase;
use crate::common::error::ProtocolResult;
use crate::common::events::{ClientEvent, EventSink, ScopeSummary, StateField};
use crate::data;
use crate::protocol::framing::OutboundFrame;
use crate::protocol::game::builder::PacketBuilder;
use crate::protocol::game::packets::*;
use crate::protocol::packets::{codes::game, hex_dump, Packet, SubCode};
use crate::protocol::ProtocolVersion;
use crate::state::character::{SharedCharacterState, SkillEntry, UNKNOWN_ID};
use crate::state::scope::{mask_id, ScopeInfo, ScopeMap, ScopeObject};

/// What the connection loop should do after a packet was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    None,
    /// Graceful logout acknowledged; close the connection.
    LoggedOut,
}

/// The capabilities handlers are allowed to touch.
pub struct HandlerContext<'a> {
    pub state: &'a SharedCharacterState,
    pub scope: &'a ScopeMap,
    pub events: &'a EventSink,
    pub movement: &'a mut MovementTicket,
    pub phase: &'a mut ConnectionPhase,
    /// Replies queued for the connection loop to send after dispatch.
    pub outbound: &'a mut Vec<OutboundFrame>,
}

impl HandlerContext<'_> {
    pub fn set_phase(&mut self, phase: ConnectionPhase) {
        if *self.phase != phase {
            *self.phase = phase;
            self.events.emit(ClientEvent::PhaseChanged(phase));
        }
    }

    fn self_id(&self) -> u16 {
        self.state.read().expect("state lock poisoned").id
    }

    fn is_self(&self, raw_id: u16) -> bool {
        let id = self.self_id();
        id != UNKNOWN_ID && mask_id(raw_id) == id
    }

    fn emit_added(&self, object: &ScopeObject) {
        self.events.emit(ClientEvent::ScopeObjectAdded(ScopeSummary {
            masked_id: object.masked_id,
            kind: object.kind(),
            label: object.label(),
            x: object.x,
            y: object.y,
        }));
    }
}

/// Handler state for the Game Server phase.
pub struct GameHandler {
    version: ProtocolVersion,
    builder: PacketBuilder,
    username: String,
    password: String,
    character_names: Vec<String>,
    started_at: Instant,
}

impl GameHandler {
    pub fn new(
        version: ProtocolVersion,
        builder: PacketBuilder,
        username: &str,
        password: &str,
    ) -> Self {
        Self {
            version,
            builder,
            username: username.to_string(),
            password: password.to_string(),
            character_names: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn builder(&self) -> &PacketBuilder {
        &self.builder
    }

    /// Names from the last character list, for local validation of `select`.
    pub fn character_names(&self) -> &[String] {
        &self.character_names
    }

    /// Monotonic millisecond clock embedded in the login packet.
    pub fn tick_count(&self) -> u32 {
        self.started_at.elapsed().as_millis() as u32
    }

    /// Dispatch one packet. Decode failures bubble up so the caller can log
    /// the payload hex and keep the connection alive.
    pub fn handle(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<GameAction> {
        let result: ProtocolResult<()> = match (packet.main, packet.sub) {
            (game::SESSION, SubCode::Code(game::HELLO_SUB)) => self.on_hello(ctx),
            (game::SESSION, SubCode::Code(game::LOGIN_SUB)) => self.on_login_response(ctx, packet),
            (game::SESSION, SubCode::Code(game::LOGOUT_SUB)) => {
                info!("Logout acknowledged by server");
                return Ok(GameAction::LoggedOut);
            }
            (game::CHARACTER, SubCode::Code(game::CHARACTER_LIST_SUB)) => {
                self.on_character_list(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::CHARACTER_INFO_SUB)) => {
                self.on_character_information(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::STAT_INCREASE_SUB)) => {
                self.on_stat_increase(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::LEVEL_UPDATE_SUB)) => {
                self.on_level_update(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::INVENTORY_LIST_SUB)) => {
                self.on_inventory_list(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::SKILL_LIST_SUB)) => {
                self.on_skill_list(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::MASTER_SKILL_LIST_SUB)) => {
                self.on_master_skill_list(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::MASTER_STATS_SUB)) => {
                self.on_master_stats(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::MASTER_LEVEL_UPDATE_SUB)) => {
                self.on_master_level(ctx, packet)
            }
            (game::CHARACTER, SubCode::Code(game::MASTER_SKILL_LEVEL_SUB)) => {
                self.on_master_skill_level(ctx, packet)
            }
            (game::ADD_CHARACTERS_TO_SCOPE, _) => self.on_add_characters(ctx, packet),
            (game::ADD_NPCS_TO_SCOPE, _) => self.on_add_npcs(ctx, packet),
            (game::MAP_OBJECT_OUT_OF_SCOPE, _) | (game::ITEM_DROP_REMOVED, _) => {
                self.on_removal_list(ctx, packet)
            }
            (game::OBJECT_MOVED, _) => self.on_object_moved(ctx, packet),
            (game::OBJECT_WALKED, _) => self.on_object_walked(ctx, packet),
            (game::OBJECT_GOT_KILLED, _) => self.on_object_killed(ctx, packet),
            (game::OBJECT_ANIMATION, _) => self.on_object_animation(packet),
            (game::EXPERIENCE_GAINED, _) => self.on_experience(ctx, packet),
            (game::MAP_CHANGED, SubCode::Code(_)) => self.on_map_changed(ctx, packet),
            (game::ITEMS_DROPPED, _) => self.on_items_dropped(ctx, packet),
            (game::MONEY_DROPPED_EXTENDED, _) => self.on_money_dropped(ctx, packet),
            (game::ITEM_ADDED_TO_INVENTORY, _) => self.on_item_added(ctx, packet),
            (game::ITEM_REMOVED, _) => self.on_item_removed(ctx, packet),
            (game::ITEM_DURABILITY_CHANGED, _) => self.on_durability_changed(ctx, packet),
            (game::HEALTH_SHIELD, SubCode::Code(sub)) => self.on_health_shield(ctx, packet, sub),
            (game::MANA_ABILITY, SubCode::Code(sub)) => self.on_mana_ability(ctx, packet, sub),
            (game::ASSIGN_TO_GUILD, _) => self.on_guild_assignments(ctx, packet),
            (game::GUILD_MEMBER_LEFT, _) => self.on_guild_member_left(ctx, packet),
            _ => {
                debug!(
                    main = format_args!("{:#04X}", packet.main),
                    sub = %packet.sub,
                    "Unhandled packet: {}",
                    hex_dump(&packet.body)
                );
                Ok(())
            }
        };
        result.map(|()| GameAction::None)
    }

    // ========================================================================
    // Session
    // ========================================================================

    fn on_hello(&mut self, ctx: &mut HandlerContext<'_>) -> ProtocolResult<()> {
        info!("Game server greeting received, logging in as {}", self.username);
        let login = self
            .builder
            .login(&self.username, &self.password, self.tick_count());
        ctx.outbound.push(login);
        Ok(())
    }

    fn on_login_response(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let response = LoginResponse::decode(&mut body)?;
        if response.succeeded() {
            info!("Login accepted, requesting character list");
            ctx.events.emit(ClientEvent::LoginSucceeded);
            ctx.outbound.push(self.builder.request_character_list());
        } else {
            let reason = login_failure_reason(response.result);
            warn!(code = response.result, "Login rejected: {reason}");
            ctx.events.emit(ClientEvent::LoginFailed {
                code: response.result,
                reason,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Character selection and self state
    // ========================================================================

    fn on_character_list(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let list = CharacterList::decode(&mut body)?;
        info!("Received {} character(s)", list.characters.len());
        self.character_names = list.characters.iter().map(|c| c.name.clone()).collect();
        ctx.events.emit(ClientEvent::CharacterList(list.characters));
        Ok(())
    }

    fn on_character_information(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let info = CharacterInformation::decode(&mut body, self.version)?;

        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            // The server starts reporting a fresh object id after entering
            // the world; it is adopted from the first matching scope record.
            state.id = UNKNOWN_ID;
            state.class = info.class;
            state.status = info.status;
            state.hero_state = info.hero_state;
            state.level = info.level;
            state.experience = info.experience;
            state.set_exp_to_next(info.exp_to_next);
            state.level_points = info.level_points;
            state.strength = info.strength;
            state.agility = info.agility;
            state.vitality = info.vitality;
            state.energy = info.energy;
            state.leadership = info.leadership;
            state.set_current_health_shield(info.cur_hp, info.cur_sd);
            state.set_max_health_shield(info.max_hp, info.max_sd);
            state.set_current_mana_ability(info.cur_mp, info.cur_ag);
            state.set_max_mana_ability(info.max_mp, info.max_ag);
            state.map_id = info.map_id;
            state.position_x = info.x;
            state.position_y = info.y;
            state.zen = info.zen;
            state.expansion_state = info.expansion_state;
        }

        ctx.scope.clear();
        ctx.movement.release();
        ctx.set_phase(ConnectionPhase::InGame);
        info!(
            "Entered {} at ({}, {})",
            data::map_name(info.map_id),
            info.x,
            info.y
        );
        ctx.events.emit(ClientEvent::EnteredGame {
            map_id: info.map_id,
            x: info.x,
            y: info.y,
        });
        Ok(())
    }

    fn on_map_changed(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let change = MapChanged::decode(&mut body)?;

        let self_id = {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.map_id = change.map_id;
            state.position_x = change.x;
            state.position_y = change.y;
            state.id
        };

        // The server re-reports everything visible on the new map; only the
        // self object may survive the reset.
        if self_id != UNKNOWN_ID {
            ctx.scope.clear_except(self_id);
        } else {
            ctx.scope.clear();
        }
        ctx.movement.release();

        info!(
            "Map changed to {} ({}, {})",
            data::map_name(change.map_id),
            change.x,
            change.y
        );
        ctx.events.emit(ClientEvent::MapChanged {
            map_id: change.map_id,
            x: change.x,
            y: change.y,
        });
        Ok(())
    }

    fn on_stat_increase(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let response = StatIncreaseResponse::decode(&mut body)?;
        if !response.success {
            ctx.events.notice("Stat increase rejected");
            return Ok(());
        }
        let Some(attribute) = StatAttribute::from_wire(response.attribute) else {
            warn!(attribute = response.attribute, "Unknown stat attribute");
            return Ok(());
        };
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            match attribute {
                StatAttribute::Strength => state.strength += 1,
                StatAttribute::Agility => state.agility += 1,
                StatAttribute::Vitality => state.vitality += 1,
                StatAttribute::Energy => state.energy += 1,
                StatAttribute::Leadership => state.leadership += 1,
            }
            state.level_points = state.level_points.saturating_sub(1);
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Stats));
        Ok(())
    }

    fn on_level_update(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let update = LevelUpdate::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.level = update.level;
            state.level_points = update.level_points;
            state.set_exp_to_next(update.exp_to_next);
            state.set_max_health_shield(update.max_hp, update.max_sd);
            state.set_max_mana_ability(update.max_mp, update.max_ag);
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Level));
        ctx.events.notice(format!("Welcome to level {}", update.level));
        Ok(())
    }

    fn on_experience(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let gained = ExperienceGained::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.experience = state.experience.saturating_add(gained.amount as u64);
        }
        ctx.events
            .emit(ClientEvent::CharacterStateChanged(StateField::Experience));
        Ok(())
    }

    fn on_health_shield(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
        sub: u8,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let update = VitalsUpdate::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            match sub {
                game::VITALS_MAX_SUB => state.set_max_health_shield(update.first, update.second),
                game::VITALS_CURRENT_SUB => {
                    state.set_current_health_shield(update.first, update.second)
                }
                _ => {
                    warn!(sub, "Unknown health/shield sub-code");
                    return Ok(());
                }
            }
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Vitals));
        Ok(())
    }

    fn on_mana_ability(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
        sub: u8,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let update = VitalsUpdate::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            match sub {
                game::VITALS_MAX_SUB => state.set_max_mana_ability(update.first, update.second),
                game::VITALS_CURRENT_SUB => {
                    state.set_current_mana_ability(update.first, update.second)
                }
                _ => {
                    warn!(sub, "Unknown mana/ability sub-code");
                    return Ok(());
                }
            }
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Vitals));
        Ok(())
    }

    // ========================================================================
    // Master level
    // ========================================================================

    fn on_master_skill_list(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let entries = MasterSkillEntry::decode_many(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            for entry in &entries {
                state.skills.insert(
                    entry.skill_id,
                    SkillEntry {
                        level: entry.level,
                        display: Some(entry.display),
                        next_display: Some(entry.next_display),
                    },
                );
            }
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Skills));
        Ok(())
    }

    fn on_master_stats(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let update = MasterStatsUpdate::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.master_level = update.master_level;
            state.master_experience = update.master_experience;
            state.set_master_exp_to_next(update.master_exp_to_next);
            state.master_level_points = update.master_level_points;
        }
        ctx.events
            .emit(ClientEvent::CharacterStateChanged(StateField::MasterLevel));
        Ok(())
    }

    fn on_master_level(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let update = MasterLevelUpdate::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.master_level = update.master_level;
            state.master_level_points = update.master_level_points;
            state.set_master_exp_to_next(update.master_exp_to_next);
        }
        ctx.events
            .emit(ClientEvent::CharacterStateChanged(StateField::MasterLevel));
        ctx.events
            .notice(format!("Master level {}", update.master_level));
        Ok(())
    }

    fn on_master_skill_level(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let entry = MasterSkillEntry::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.skills.insert(
                entry.skill_id,
                SkillEntry {
                    level: entry.level,
                    display: Some(entry.display),
                    next_display: Some(entry.next_display),
                },
            );
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Skills));
        Ok(())
    }

    // ========================================================================
    // Scope
    // ========================================================================

    fn on_add_characters(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let records = ScopeCharacter::decode_many(&mut body, self.version)?;

        for record in records {
            // Adopt the first record matching our character name as the
            // self id; the server never states it explicitly.
            let adopted = {
                let mut state = ctx.state.write().expect("state lock poisoned");
                if !state.has_identity() && !state.name.is_empty() && record.name == state.name {
                    state.id = mask_id(record.raw_id);
                    state.position_x = record.x;
                    state.position_y = record.y;
                    state.hero_state = record.hero_state;
                    true
                } else {
                    false
                }
            };
            if adopted {
                debug!(id = mask_id(record.raw_id), "Adopted self object id");
                ctx.events
                    .emit(ClientEvent::CharacterStateChanged(StateField::Identity));
            }

            let object = ScopeObject::new(
                record.raw_id,
                record.x,
                record.y,
                ScopeInfo::Player { name: record.name },
            );
            ctx.emit_added(&object);
            ctx.scope.add_or_update(object);
        }
        Ok(())
    }

    fn on_add_npcs(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let records = ScopeNpc::decode_many(&mut body, self.version)?;
        for record in records {
            let display_name = data::npc_name(record.type_number)
                .map(str::to_string)
                .unwrap_or_default();
            let info = if data::is_town_npc(record.type_number) {
                ScopeInfo::Npc {
                    type_number: record.type_number,
                    display_name,
                }
            } else {
                ScopeInfo::Monster {
                    type_number: record.type_number,
                    display_name,
                }
            };
            let object = ScopeObject::new(record.raw_id, record.x, record.y, info);
            ctx.emit_added(&object);
            ctx.scope.add_or_update(object);
        }
        Ok(())
    }

    fn on_removal_list(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let ids = decode_id_list(&mut body)?;
        for raw_id in ids {
            if ctx.scope.remove(raw_id) {
                ctx.events.emit(ClientEvent::ScopeObjectRemoved {
                    masked_id: mask_id(raw_id),
                });
            }
        }
        Ok(())
    }

    fn on_items_dropped(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let records = DroppedObject::decode_many(&mut body, self.version)?;
        for record in records {
            let info = match classify_drop(&record.item_data) {
                DropKind::Money(amount) => ScopeInfo::Money { amount },
                DropKind::Item => ScopeInfo::Item {
                    item_data: record.item_data,
                },
            };
            let object = ScopeObject::new(record.raw_id, record.x, record.y, info);
            ctx.emit_added(&object);
            ctx.scope.add_or_update(object);
        }
        Ok(())
    }

    fn on_money_dropped(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let drop = MoneyDrop::decode(&mut body)?;
        let object = ScopeObject::new(
            drop.raw_id,
            drop.x,
            drop.y,
            ScopeInfo::Money {
                amount: drop.amount,
            },
        );
        ctx.emit_added(&object);
        ctx.scope.add_or_update(object);
        Ok(())
    }

    // ========================================================================
    // Movement and death
    // ========================================================================

    fn on_object_moved(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let moved = ObjectMoved::decode(&mut body)?;

        if ctx.is_self(moved.raw_id) {
            {
                let mut state = ctx.state.write().expect("state lock poisoned");
                state.position_x = moved.x;
                state.position_y = moved.y;
            }
            if ctx.movement.release() {
                ctx.events.emit(ClientEvent::MovementConfirmed {
                    x: moved.x,
                    y: moved.y,
                });
            }
            ctx.events
                .emit(ClientEvent::CharacterStateChanged(StateField::Position));
        }
        // The self object is mirrored in scope like everything else.
        ctx.scope.update_position(moved.raw_id, moved.x, moved.y);
        Ok(())
    }

    fn on_object_walked(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let walked = ObjectWalked::decode(&mut body)?;

        if ctx.is_self(walked.raw_id) {
            {
                let mut state = ctx.state.write().expect("state lock poisoned");
                state.position_x = walked.x;
                state.position_y = walked.y;
            }
            // A zero step count terminates the walk (stop or rotate only).
            if walked.step_count == 0 && ctx.movement.release() {
                ctx.events.emit(ClientEvent::MovementConfirmed {
                    x: walked.x,
                    y: walked.y,
                });
            }
            ctx.events
                .emit(ClientEvent::CharacterStateChanged(StateField::Position));
        }
        ctx.scope.update_position(walked.raw_id, walked.x, walked.y);
        Ok(())
    }

    fn on_object_killed(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let killed = ObjectKilled::decode(&mut body)?;

        if ctx.is_self(killed.victim_raw_id) {
            {
                let mut state = ctx.state.write().expect("state lock poisoned");
                state.cur_hp = 0;
                state.cur_sd = 0;
            }
            ctx.movement.release();
            let killer = ctx.scope.find_name(killed.killer_raw_id);
            warn!("Character died");
            ctx.events.emit(ClientEvent::Died { killer });
            ctx.events
                .emit(ClientEvent::CharacterStateChanged(StateField::Vitals));
        } else if ctx.scope.remove(killed.victim_raw_id) {
            ctx.events.emit(ClientEvent::ScopeObjectRemoved {
                masked_id: mask_id(killed.victim_raw_id),
            });
        }
        Ok(())
    }

    fn on_object_animation(&mut self, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let animation = ObjectAnimation::decode(&mut body)?;
        debug!(
            id = mask_id(animation.raw_id),
            animation = animation.animation,
            "Object animation"
        );
        Ok(())
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    fn on_inventory_list(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let list = InventoryList::decode(&mut body, self.version)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.expansion_state = list.expansion_state;
            state.inventory = list.items.into_iter().collect();
        }
        ctx.events
            .emit(ClientEvent::CharacterStateChanged(StateField::Inventory));
        Ok(())
    }

    fn on_item_added(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        match InventoryAddition::decode(&mut body, self.version)? {
            InventoryAddition::Item { slot, item_data } => {
                let mut state = ctx.state.write().expect("state lock poisoned");
                state.inventory.insert(slot, item_data);
                drop(state);
                ctx.events
                    .emit(ClientEvent::CharacterStateChanged(StateField::Inventory));
            }
            InventoryAddition::Money { amount } => {
                let mut state = ctx.state.write().expect("state lock poisoned");
                state.zen = state.zen.saturating_add(amount);
                let zen = state.zen;
                drop(state);
                ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Zen));
                ctx.events.notice(format!("Picked up {amount} zen ({zen} total)"));
            }
            InventoryAddition::Failed => {
                ctx.events.notice("Pickup failed");
            }
        }
        Ok(())
    }

    fn on_item_removed(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let removed = ItemRemoved::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.inventory.remove(&removed.slot);
        }
        ctx.events
            .emit(ClientEvent::CharacterStateChanged(StateField::Inventory));
        Ok(())
    }

    fn on_durability_changed(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let change = DurabilityChange::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            match state.inventory.get_mut(&change.slot) {
                // Durability lives at byte index 2 of the item data.
                Some(item_data) if item_data.len() > 2 => item_data[2] = change.durability,
                Some(_) => warn!(slot = change.slot, "Item data too short for durability"),
                None => warn!(slot = change.slot, "Durability update for empty slot"),
            }
        }
        ctx.events
            .emit(ClientEvent::CharacterStateChanged(StateField::Inventory));
        Ok(())
    }

    fn on_skill_list(&mut self, ctx: &mut HandlerContext<'_>, packet: &Packet) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let list = SkillList::decode(&mut body)?;
        {
            let mut state = ctx.state.write().expect("state lock poisoned");
            state.skills = list
                .skills
                .into_iter()
                .map(|(id, level)| {
                    (
                        id,
                        SkillEntry {
                            level,
                            display: None,
                            next_display: None,
                        },
                    )
                })
                .collect();
        }
        ctx.events.emit(ClientEvent::CharacterStateChanged(StateField::Skills));
        Ok(())
    }

    // ========================================================================
    // Guild
    // ========================================================================

    fn on_guild_assignments(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let entries = GuildAssignment::decode_many(&mut body)?;
        for entry in entries {
            let who = ctx
                .scope
                .find_name(entry.raw_id)
                .unwrap_or_else(|| format!("#{}", mask_id(entry.raw_id)));
            ctx.events
                .notice(format!("{} belongs to guild {}", who, entry.guild_name));
        }
        Ok(())
    }

    fn on_guild_member_left(
        &mut self,
        ctx: &mut HandlerContext<'_>,
        packet: &Packet,
    ) -> ProtocolResult<()> {
        let mut body = packet.body.clone();
        let left = GuildMemberLeft::decode(&mut body)?;
        let who = ctx
            .scope
            .find_name(left.raw_id)
            .unwrap_or_else(|| format!("#{}", mask_id(left.raw_id)));
        ctx.events.notice(format!("{who} left their guild"));
        Ok(())
    }
}
