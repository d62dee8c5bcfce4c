//! Payload ciphers for game-server traffic.
//!
//! Encrypted frames carry a SimpleModulus stream; client-to-server traffic
//! is additionally obfuscated with the Xor32 chain after block encryption.
//! Login credentials get a third, tiny rolling-xor pass before they are
//! embedded in the login packet.

pub mod simple_modulus;
pub mod xor32;

pub use simple_modulus::{KeySet, SimpleModulus};
pub use xor32::{xor3, Xor32};
