//! Configuration file parsing (HOCON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    hocon_rs::Config::load(path, None).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
    })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    hocon_rs::Config::parse_str(content, None).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolVersion;

    #[test]
    fn parses_a_minimal_config() {
        let content = r#"
            server {
              host = "127.0.0.1"
              port = 44405
            }
            account {
              username = "admin"
              password = "secret"
            }
            client {
              protocol = "Season6"
              version = "10404"
              serial = "k1Pk2jcET48mxL3b"
            }
        "#;
        let config = load_config_str(content).unwrap();
        assert_eq!(config.server.port, 44405);
        assert_eq!(config.client.protocol, ProtocolVersion::Season6);
        // Direction map falls back to the identity permutation.
        assert_eq!(config.client.direction_map, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }
}
