//! Packet types and payload read helpers.

use bytes::{Buf, Bytes};

use crate::common::error::{ProtocolError, ProtocolResult};

pub mod codes;

/// Second discriminator byte, present at payload offset zero for the main
/// codes listed in [`codes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubCode {
    NoSubCode,
    Code(u8),
}

impl std::fmt::Display for SubCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubCode::NoSubCode => write!(f, "--"),
            SubCode::Code(sub) => write!(f, "{sub:02X}"),
        }
    }
}

/// One routed packet: main code, optional sub-code, remaining payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub main: u8,
    pub sub: SubCode,
    pub body: Bytes,
}

impl Packet {
    /// Split a frame body into main code, sub-code and payload, consuming
    /// the first payload byte as sub-code when `has_sub_code` says the main
    /// code carries one.
    pub fn classify(
        main: u8,
        mut payload: Bytes,
        has_sub_code: fn(u8) -> bool,
    ) -> ProtocolResult<Packet> {
        let sub = if has_sub_code(main) {
            if payload.is_empty() {
                return Err(ProtocolError::PacketTooShort { needed: 1, got: 0 });
            }
            SubCode::Code(payload.get_u8())
        } else {
            SubCode::NoSubCode
        };
        Ok(Packet {
            main,
            sub,
            body: payload,
        })
    }
}

/// Fail with `PacketTooShort` unless `buf` still holds `needed` bytes.
pub fn require(buf: &impl Buf, needed: usize) -> ProtocolResult<()> {
    if buf.remaining() < needed {
        return Err(ProtocolError::PacketTooShort {
            needed,
            got: buf.remaining(),
        });
    }
    Ok(())
}

/// Read a fixed-width, null-padded ASCII field (names are 10 bytes on the
/// wire, guild names 8). Trailing garbage after the first NUL is ignored.
pub fn read_fixed_string(buf: &mut impl Buf, width: usize) -> ProtocolResult<String> {
    require(buf, width)?;
    let mut raw = vec![0u8; width];
    buf.copy_to_slice(&mut raw);
    let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(String::from_utf8_lossy(&raw[..end]).to_string())
}

/// Uppercase hex rendering for packet logging.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}
