//! Wire protocol: framing, ciphers, packet codes and both server dialects.

pub mod connect;
pub mod crypto;
pub mod framing;
pub mod game;
pub mod packets;

use serde::Deserialize;

/// Protocol dialect, selected once at startup. Main codes are shared across
/// versions; record layouts differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ProtocolVersion {
    Season6,
    Version097,
    Version075,
}

impl ProtocolVersion {
    /// Wire length of one item-data blob for this dialect.
    pub fn item_data_len(self) -> usize {
        match self {
            ProtocolVersion::Season6 => 12,
            ProtocolVersion::Version097 => 7,
            ProtocolVersion::Version075 => 5,
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolVersion::Season6 => write!(f, "Season 6"),
            ProtocolVersion::Version097 => write!(f, "0.97"),
            ProtocolVersion::Version075 => write!(f, "0.75"),
        }
    }
}
