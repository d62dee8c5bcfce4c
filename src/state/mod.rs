//! Client-side mirrors of server-reported state.

pub mod character;
pub mod scope;

pub use character::{CharacterState, SharedCharacterState, UNKNOWN_ID};
pub use scope::{mask_id, ScopeInfo, ScopeMap, ScopeObject, ScopeObjectKind};
