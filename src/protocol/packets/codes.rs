//! Protocol codes for the Connect Server and Game Server dialects, plus the
//! sub-code registries that tell the router which main codes carry a second
//! discriminator byte.

// ============================================================================
// Connect Server codes
// ============================================================================

pub mod connect {
    /// Server -> Client: greeting after TCP accept (sub 0x01).
    pub const HELLO: u8 = 0x00;
    pub const HELLO_SUB: u8 = 0x01;

    /// Both directions: server list and game-server connection info share the
    /// same main code and differ by sub-code.
    pub const SERVER_INFO: u8 = 0xF4;
    pub const CONNECTION_INFO_SUB: u8 = 0x03;
    pub const SERVER_LIST_SUB: u8 = 0x06;
}

/// Main codes on the Connect Server whose first payload byte is a sub-code.
pub fn connect_has_sub_code(main: u8) -> bool {
    matches!(main, 0x00 | 0x05 | 0xF4)
}

// ============================================================================
// Game Server codes
// ============================================================================

pub mod game {
    /// Session family: hello (sub 0x00), login response (sub 0x01), logout
    /// (sub 0x02).
    pub const SESSION: u8 = 0xF1;
    pub const HELLO_SUB: u8 = 0x00;
    pub const LOGIN_SUB: u8 = 0x01;
    pub const LOGOUT_SUB: u8 = 0x02;

    /// Character family.
    pub const CHARACTER: u8 = 0xF3;
    pub const CHARACTER_LIST_SUB: u8 = 0x00;
    pub const SELECT_CHARACTER_SUB: u8 = 0x01;
    pub const CHARACTER_INFO_SUB: u8 = 0x03;
    pub const STAT_INCREASE_SUB: u8 = 0x05;
    pub const LEVEL_UPDATE_SUB: u8 = 0x06;
    pub const INVENTORY_LIST_SUB: u8 = 0x10;
    pub const SKILL_LIST_SUB: u8 = 0x11;
    pub const MASTER_SKILL_LIST_SUB: u8 = 0x50;
    pub const MASTER_STATS_SUB: u8 = 0x51;
    pub const MASTER_LEVEL_UPDATE_SUB: u8 = 0x52;
    pub const MASTER_SKILL_LEVEL_SUB: u8 = 0x53;

    // Scope
    pub const ADD_CHARACTERS_TO_SCOPE: u8 = 0x12;
    pub const ADD_NPCS_TO_SCOPE: u8 = 0x13;
    pub const MAP_OBJECT_OUT_OF_SCOPE: u8 = 0x14;
    pub const OBJECT_MOVED: u8 = 0x15;
    pub const EXPERIENCE_GAINED: u8 = 0x16;
    pub const OBJECT_GOT_KILLED: u8 = 0x17;
    pub const OBJECT_ANIMATION: u8 = 0x18;
    pub const MAP_CHANGED: u8 = 0x1C;
    pub const ITEMS_DROPPED: u8 = 0x20;
    pub const ITEM_DROP_REMOVED: u8 = 0x21;
    pub const ITEM_ADDED_TO_INVENTORY: u8 = 0x22;
    pub const ITEM_REMOVED: u8 = 0x28;
    pub const ITEM_DURABILITY_CHANGED: u8 = 0x2A;
    pub const MONEY_DROPPED_EXTENDED: u8 = 0x2F;
    pub const OBJECT_WALKED: u8 = 0xD4;

    // Vitals (sub 0xFE: maximum, sub 0xFF: current)
    pub const HEALTH_SHIELD: u8 = 0x26;
    pub const MANA_ABILITY: u8 = 0x27;
    pub const VITALS_MAX_SUB: u8 = 0xFE;
    pub const VITALS_CURRENT_SUB: u8 = 0xFF;

    // Guild
    pub const GUILD_MEMBER_LEFT: u8 = 0x5D;
    pub const ASSIGN_TO_GUILD: u8 = 0x65;

    // Inventory slot sentinels for ItemAddedToInventory
    pub const SLOT_MONEY: u8 = 0xFE;
    pub const SLOT_PICKUP_FAILED: u8 = 0xFF;
}

/// Main codes on the Game Server whose first payload byte is a sub-code.
pub fn game_has_sub_code(main: u8) -> bool {
    matches!(
        main,
        0x1C | 0x26
            | 0x27
            | 0x3A
            | 0x3F
            | 0xAA
            | 0xAF
            | 0xB2
            | 0xB3
            | 0xBD
            | 0xBF
            | 0xC1
            | 0xD0
            | 0xD1
            | 0xD2
            | 0xDE
            | 0xE1..=0xE6
            | 0xEB
            | 0xF1
            | 0xF3
            | 0xF6..=0xF9
    )
}

/// Human-readable name for a game-server packet, for logging.
pub fn game_code_name(main: u8, sub: Option<u8>) -> &'static str {
    match (main, sub) {
        (0xF1, Some(0x00)) => "Hello",
        (0xF1, Some(0x01)) => "LoginResponse",
        (0xF1, Some(0x02)) => "LogoutResponse",
        (0xF3, Some(0x00)) => "CharacterList",
        (0xF3, Some(0x03)) => "CharacterInformation",
        (0xF3, Some(0x05)) => "StatIncreaseResponse",
        (0xF3, Some(0x06)) => "LevelUpdate",
        (0xF3, Some(0x10)) => "InventoryList",
        (0xF3, Some(0x11)) => "SkillList",
        (0xF3, Some(0x50)) => "MasterSkillList",
        (0xF3, Some(0x51)) => "MasterStatsUpdate",
        (0xF3, Some(0x52)) => "MasterLevelUpdate",
        (0xF3, Some(0x53)) => "MasterSkillLevelUpdate",
        (0x12, _) => "AddCharactersToScope",
        (0x13, _) => "AddNpcsToScope",
        (0x14, _) => "MapObjectOutOfScope",
        (0x15, _) => "ObjectMoved",
        (0x16, _) => "ExperienceGained",
        (0x17, _) => "ObjectGotKilled",
        (0x18, _) => "ObjectAnimation",
        (0x1C, _) => "MapChanged",
        (0x20, _) => "ItemsDropped",
        (0x21, _) => "ItemDropRemoved",
        (0x22, _) => "ItemAddedToInventory",
        (0x26, _) => "HealthShieldUpdate",
        (0x27, _) => "ManaAbilityUpdate",
        (0x28, _) => "ItemRemoved",
        (0x2A, _) => "ItemDurabilityChanged",
        (0x2F, _) => "MoneyDroppedExtended",
        (0x5D, _) => "GuildMemberLeft",
        (0x65, _) => "AssignToGuild",
        (0xD4, _) => "ObjectWalked",
        _ => "Unknown",
    }
}
