//! Outbound Game Server packet construction.

use bytes::{BufMut, BytesMut};

use crate::protocol::crypto::xor3;
use crate::protocol::framing::OutboundFrame;
use crate::protocol::packets::codes::game;
use crate::protocol::ProtocolVersion;

/// Longest walk the request encoding can carry (4-bit step count).
pub const MAX_WALK_STEPS: usize = 15;

/// Null-padded fixed-width name field.
fn fixed_name(name: &str) -> [u8; 10] {
    let mut field = [0u8; 10];
    let bytes = name.as_bytes();
    let len = bytes.len().min(10);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Builds every client-to-server packet, parameterized with the dialect and
/// client identity chosen at startup.
pub struct PacketBuilder {
    version: ProtocolVersion,
    client_version: [u8; 5],
    client_serial: [u8; 16],
    direction_map: [u8; 8],
}

impl PacketBuilder {
    pub fn new(
        version: ProtocolVersion,
        client_version: [u8; 5],
        client_serial: [u8; 16],
        direction_map: [u8; 8],
    ) -> Self {
        Self {
            version,
            client_version,
            client_serial,
            direction_map,
        }
    }

    /// Login request. Credentials are scrambled with the rolling three-byte
    /// xor before they are embedded; the tick count is the client's
    /// monotonic millisecond clock.
    pub fn login(&self, username: &str, password: &str, tick_count: u32) -> OutboundFrame {
        let mut user = fixed_name(username);
        let mut pass = fixed_name(password);
        xor3(&mut user);
        xor3(&mut pass);

        let mut body = BytesMut::with_capacity(1 + 10 + 10 + 4 + 5 + 16);
        body.put_u8(game::LOGIN_SUB);
        body.put_slice(&user);
        body.put_slice(&pass);
        body.put_u32(tick_count);
        body.put_slice(&self.client_version);
        body.put_slice(&self.client_serial);
        OutboundFrame::new(game::SESSION, body.freeze())
    }

    pub fn logout(&self) -> OutboundFrame {
        OutboundFrame::new(game::SESSION, vec![game::LOGOUT_SUB])
    }

    pub fn request_character_list(&self) -> OutboundFrame {
        OutboundFrame::new(game::CHARACTER, vec![game::CHARACTER_LIST_SUB])
    }

    pub fn select_character(&self, name: &str) -> OutboundFrame {
        let mut body = BytesMut::with_capacity(11);
        body.put_u8(game::SELECT_CHARACTER_SUB);
        body.put_slice(&fixed_name(name));
        OutboundFrame::new(game::CHARACTER, body.freeze())
    }

    pub fn instant_move(&self, x: u8, y: u8) -> OutboundFrame {
        OutboundFrame::new(game::OBJECT_MOVED, vec![x, y])
    }

    /// Walk request: source cell, then a nibble with the initial rotation
    /// and the step count, then the steps packed two per byte. Logical
    /// directions are translated through the configured direction map.
    pub fn walk(&self, source_x: u8, source_y: u8, directions: &[u8]) -> OutboundFrame {
        let steps: Vec<u8> = directions
            .iter()
            .take(MAX_WALK_STEPS)
            .map(|&dir| self.direction_map[dir as usize & 0x07])
            .collect();
        let rotation = steps.first().copied().unwrap_or(0);

        let mut body = BytesMut::with_capacity(3 + steps.len().div_ceil(2));
        body.put_u8(source_x);
        body.put_u8(source_y);
        body.put_u8((rotation << 4) | steps.len() as u8);
        for pair in steps.chunks(2) {
            let high = pair[0] << 4;
            let low = pair.get(1).copied().unwrap_or(0);
            body.put_u8(high | low);
        }
        OutboundFrame::new(game::OBJECT_WALKED, body.freeze())
    }

    /// Pickup request with a big-endian item id. The 0.75 dialect sends this
    /// one unencrypted.
    pub fn pickup(&self, raw_id: u16) -> OutboundFrame {
        let body = raw_id.to_be_bytes().to_vec();
        match self.version {
            ProtocolVersion::Version075 => {
                OutboundFrame::plain(game::ITEM_ADDED_TO_INVENTORY, body)
            }
            _ => OutboundFrame::new(game::ITEM_ADDED_TO_INVENTORY, body),
        }
    }

    pub fn animation(&self, rotation: u8, animation: u8) -> OutboundFrame {
        OutboundFrame::new(game::OBJECT_ANIMATION, vec![rotation, animation])
    }
}
