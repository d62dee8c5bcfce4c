//! Connect Server dialect: server discovery and game-server handover.

pub mod handler;
pub mod packets;

pub use handler::{ConnectAction, ConnectHandler};
