//! Configuration validation.

use crate::common::error::ConfigError;
use crate::config::types::Config;

fn fail(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}

/// Check field shapes the wire format depends on. Runs once at startup;
/// everything downstream may assume these hold.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.host.is_empty() {
        return Err(fail("server.host must not be empty"));
    }
    if config.server.port == 0 {
        return Err(fail("server.port must not be zero"));
    }

    let username = &config.account.username;
    if username.is_empty() || username.len() > 10 || !username.is_ascii() {
        return Err(fail("account.username must be 1-10 ASCII characters"));
    }
    let password = &config.account.password;
    if password.is_empty() || password.len() > 10 || !password.is_ascii() {
        return Err(fail("account.password must be 1-10 ASCII characters"));
    }

    if config.client.version.len() != 5 || !config.client.version.is_ascii() {
        return Err(fail("client.version must be exactly 5 ASCII characters"));
    }
    if config.client.serial.len() != 16 || !config.client.serial.is_ascii() {
        return Err(fail("client.serial must be exactly 16 ASCII characters"));
    }

    let map = &config.client.direction_map;
    if map.len() != 8 {
        return Err(fail("client.direction_map must have 8 entries"));
    }
    let mut seen = [false; 8];
    for &value in map {
        if value > 7 || seen[value as usize] {
            return Err(fail(
                "client.direction_map must be a permutation of 0..=7",
            ));
        }
        seen[value as usize] = true;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AccountConfig, ClientConfig, ServerConfig};
    use crate::protocol::ProtocolVersion;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig {
                host: "play.example.com".into(),
                port: 44405,
            },
            account: AccountConfig {
                username: "admin".into(),
                password: "secret".into(),
            },
            client: ClientConfig {
                protocol: ProtocolVersion::Season6,
                version: "10404".into(),
                serial: "k1Pk2jcET48mxL3b".into(),
                direction_map: vec![0, 1, 2, 3, 4, 5, 6, 7],
            },
        }
    }

    #[test]
    fn accepts_a_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn rejects_oversized_username() {
        let mut config = valid_config();
        config.account.username = "waytoolongusername".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_wrong_version_width() {
        let mut config = valid_config();
        config.client.version = "1.04".into();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_non_permutation_direction_map() {
        let mut config = valid_config();
        config.client.direction_map = vec![0, 1, 2, 3, 4, 5, 6, 6];
        assert!(validate(&config).is_err());
        config.client.direction_map = vec![0, 1, 2];
        assert!(validate(&config).is_err());
    }
}
