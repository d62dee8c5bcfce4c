//! Configuration parsing and validation.

pub mod parser;
pub mod types;
pub mod validate;

pub use parser::{load_config, load_config_str};
pub use types::*;

use crate::common::error::ConfigError;

/// Load a config file and validate it in one step.
pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config = load_config(path)?;
    validate::validate(&config)?;
    Ok(config)
}
