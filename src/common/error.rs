//! Error types for the client.

use thiserror::Error;

use crate::client::phase::ConnectionPhase;

/// Top-level application error.
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Protocol-related errors (framing, crypto, packet decoding).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String },

    #[error("Frame length {length} out of bounds (max {max})")]
    FrameLengthOutOfBounds { length: usize, max: usize },

    #[error("Packet too short: need {needed} bytes, got {got}")]
    PacketTooShort { needed: usize, got: usize },

    #[error("Invalid packet: {message}")]
    #[allow(dead_code)]
    InvalidPacket { message: String },

    #[error("Encryption error: {message}")]
    #[allow(dead_code)]
    Encryption { message: String },

    #[error("Decryption error: {message}")]
    Decryption { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("No IPv4 address found for '{host}'")]
    NoIpv4Address { host: String },

    #[error("Already connected; disconnect first")]
    #[allow(dead_code)]
    AlreadyConnected,

    #[error("Connection closed by remote")]
    #[allow(dead_code)]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned to the console for rejected user commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("'{command}' is not available while {phase}")]
    PhaseMismatch {
        command: &'static str,
        phase: ConnectionPhase,
    },

    #[error("Unknown command: {line}")]
    UnknownCommand { line: String },

    #[error("Invalid arguments, usage: {usage}")]
    InvalidArguments { usage: &'static str },
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
