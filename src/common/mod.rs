//! Shared error and event types.

pub mod error;
pub mod events;

pub use error::{AppError, CommandError, ConfigError, ConnectionError, ProtocolError};
pub use events::{ClientEvent, EventSink, StateField};
