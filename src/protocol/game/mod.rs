//! Game Server dialect: session, character, scope and inventory traffic.

pub mod builder;
pub mod handler;
pub mod item;
pub mod packets;

pub use handler::{GameAction, GameHandler, HandlerContext};
