//! Configuration type definitions.

use serde::Deserialize;

use crate::protocol::ProtocolVersion;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub account: AccountConfig,
    pub client: ClientConfig,
}

/// Connect Server address.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Account credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
}

/// Client identity and dialect.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub protocol: ProtocolVersion,
    /// Client version, exactly five ASCII bytes (e.g. "10404").
    pub version: String,
    /// Client serial, exactly sixteen ASCII bytes.
    pub serial: String,
    /// Permutation translating logical directions (0 north, clockwise) to
    /// wire direction values.
    #[serde(default = "default_direction_map")]
    pub direction_map: Vec<u8>,
}

fn default_direction_map() -> Vec<u8> {
    vec![0, 1, 2, 3, 4, 5, 6, 7]
}

impl ClientConfig {
    pub fn version_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes.copy_from_slice(&self.version.as_bytes()[..5]);
        bytes
    }

    pub fn serial_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.serial.as_bytes()[..16]);
        bytes
    }

    pub fn direction_map_array(&self) -> [u8; 8] {
        let mut map = [0u8; 8];
        map.copy_from_slice(&self.direction_map[..8]);
        map
    }
}
