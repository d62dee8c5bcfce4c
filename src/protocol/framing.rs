//! Wire framing for the four frame types.
//!
//! `C1`/`C2` are plain frames with one- and two-byte length fields; `C3`/`C4`
//! carry the same shapes with the region after the length field encrypted.
//! The code byte sits inside the encrypted region, so decoding yields the
//! decrypted `(type, code, payload)` triple and encoding re-emits the length
//! prefix from the ciphertext size (8-byte plaintext blocks grow to 11 bytes
//! on the wire).

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::common::error::{ProtocolError, ProtocolResult};
use crate::protocol::crypto::{KeySet, SimpleModulus, Xor32};

/// Upper bound for one frame, header included.
pub const MAX_FRAME_LEN: usize = 8 * 1024;

/// The four wire frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    C1,
    C2,
    C3,
    C4,
}

impl FrameKind {
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            0xC1 => Some(FrameKind::C1),
            0xC2 => Some(FrameKind::C2),
            0xC3 => Some(FrameKind::C3),
            0xC4 => Some(FrameKind::C4),
            _ => None,
        }
    }

    pub fn type_byte(self) -> u8 {
        match self {
            FrameKind::C1 => 0xC1,
            FrameKind::C2 => 0xC2,
            FrameKind::C3 => 0xC3,
            FrameKind::C4 => 0xC4,
        }
    }

    /// Bytes taken by the type and length fields.
    pub fn header_len(self) -> usize {
        match self {
            FrameKind::C1 | FrameKind::C3 => 2,
            FrameKind::C2 | FrameKind::C4 => 3,
        }
    }

    pub fn is_encrypted(self) -> bool {
        matches!(self, FrameKind::C3 | FrameKind::C4)
    }
}

/// One decoded inbound frame. The payload is already decrypted.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    pub code: u8,
    pub payload: Bytes,
}

/// One outbound frame before framing. `plain` forces a C1/C2 frame even on
/// an encrypted connection (the 0.75 pickup request goes out unencrypted).
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub code: u8,
    pub body: Bytes,
    pub plain: bool,
}

impl OutboundFrame {
    pub fn new(code: u8, body: impl Into<Bytes>) -> Self {
        Self {
            code,
            body: body.into(),
            plain: false,
        }
    }

    pub fn plain(code: u8, body: impl Into<Bytes>) -> Self {
        Self {
            code,
            body: body.into(),
            plain: true,
        }
    }
}

/// Which end of an encrypted connection the codec sits on. The client xors
/// outbound ciphertext with the Xor32 chain; the server strips that chain on
/// decode. Inbound server-to-client traffic carries no Xor32 layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Client,
    Server,
}

/// Per-connection crypto decision, fixed at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoMode {
    Plain,
    Encrypted(Side),
}

/// Codec turning raw bytes into [`Frame`]s and [`OutboundFrame`]s into wire
/// bytes.
pub struct FrameCodec {
    mode: CryptoMode,
    encryptor: Option<SimpleModulus>,
    decryptor: Option<SimpleModulus>,
}

impl FrameCodec {
    pub fn new(mode: CryptoMode) -> Self {
        let (encryptor, decryptor) = match mode {
            CryptoMode::Plain => (None, None),
            CryptoMode::Encrypted(Side::Client) => (
                Some(SimpleModulus::new(KeySet::client_to_server())),
                Some(SimpleModulus::new(KeySet::server_to_client())),
            ),
            CryptoMode::Encrypted(Side::Server) => (
                Some(SimpleModulus::new(KeySet::server_to_client())),
                Some(SimpleModulus::new(KeySet::client_to_server())),
            ),
        };
        Self {
            mode,
            encryptor,
            decryptor,
        }
    }

    pub fn plain() -> Self {
        Self::new(CryptoMode::Plain)
    }

    pub fn encrypted(side: Side) -> Self {
        Self::new(CryptoMode::Encrypted(side))
    }

    fn decrypt_body(&self, body: &[u8]) -> ProtocolResult<Vec<u8>> {
        let decryptor = self
            .decryptor
            .as_ref()
            .ok_or_else(|| ProtocolError::MalformedFrame {
                message: "encrypted frame on a plain connection".into(),
            })?;
        let mut blob = body.to_vec();
        if matches!(self.mode, CryptoMode::Encrypted(Side::Server)) {
            Xor32::decrypt(&mut blob);
        }
        decryptor.decrypt(&blob)
    }

    fn write_header(dst: &mut BytesMut, body_len: usize, encrypted: bool) -> ProtocolResult<()> {
        let small_total = 2 + body_len;
        if small_total <= u8::MAX as usize {
            let kind = if encrypted { FrameKind::C3 } else { FrameKind::C1 };
            dst.reserve(small_total);
            dst.put_u8(kind.type_byte());
            dst.put_u8(small_total as u8);
            return Ok(());
        }

        let large_total = 3 + body_len;
        if large_total > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameLengthOutOfBounds {
                length: large_total,
                max: MAX_FRAME_LEN,
            });
        }
        let kind = if encrypted { FrameKind::C4 } else { FrameKind::C2 };
        dst.reserve(large_total);
        dst.put_u8(kind.type_byte());
        dst.put_u16(large_total as u16);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        if src.is_empty() {
            return Ok(None);
        }

        let kind = FrameKind::from_type_byte(src[0]).ok_or_else(|| ProtocolError::MalformedFrame {
            message: format!("unknown frame type {:#04X}", src[0]),
        })?;
        let header = kind.header_len();
        if src.len() < header {
            return Ok(None);
        }

        let length = match kind {
            FrameKind::C1 | FrameKind::C3 => src[1] as usize,
            FrameKind::C2 | FrameKind::C4 => u16::from_be_bytes([src[1], src[2]]) as usize,
        };
        if length <= header || length > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameLengthOutOfBounds {
                length,
                max: MAX_FRAME_LEN,
            });
        }
        if src.len() < length {
            src.reserve(length - src.len());
            return Ok(None);
        }

        let frame = src.split_to(length).freeze();
        let body = frame.slice(header..);

        if kind.is_encrypted() {
            let plain = self.decrypt_body(&body)?;
            let (code, payload) = plain.split_first().ok_or(ProtocolError::MalformedFrame {
                message: "encrypted frame decrypted to nothing".into(),
            })?;
            Ok(Some(Frame {
                kind,
                code: *code,
                payload: Bytes::copy_from_slice(payload),
            }))
        } else {
            Ok(Some(Frame {
                kind,
                code: body[0],
                payload: body.slice(1..),
            }))
        }
    }
}

impl Encoder<OutboundFrame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: OutboundFrame, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        match (self.mode, self.encryptor.as_ref()) {
            (CryptoMode::Encrypted(side), Some(encryptor)) if !item.plain => {
                let mut plain = Vec::with_capacity(1 + item.body.len());
                plain.push(item.code);
                plain.extend_from_slice(&item.body);
                let mut blob = encryptor.encrypt(&plain);
                if side == Side::Client {
                    Xor32::encrypt(&mut blob);
                }
                Self::write_header(dst, blob.len(), true)?;
                dst.put_slice(&blob);
            }
            _ => {
                Self::write_header(dst, 1 + item.body.len(), false)?;
                dst.put_u8(item.code);
                dst.put_slice(&item.body);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::{codes, Packet, SubCode};

    fn decode_all(codec: &mut FrameCodec, bytes: &[u8]) -> Vec<Frame> {
        let mut buf = BytesMut::from(bytes);
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(&mut buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn c1_frame_round_trips_through_router_classification() {
        let mut codec = FrameCodec::plain();
        let mut wire = BytesMut::new();
        codec
            .encode(
                OutboundFrame::new(0xF3, vec![0x00, 0x01, b'A', b'D', b'M']),
                &mut wire,
            )
            .unwrap();
        assert_eq!(
            wire.as_ref(),
            hex_literal::hex!("C1 08 F3 00 01 41 44 4D")
        );

        let frames = decode_all(&mut codec, &wire);
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.kind, FrameKind::C1);
        assert_eq!(frame.code, 0xF3);

        let packet =
            Packet::classify(frame.code, frame.payload.clone(), codes::game_has_sub_code).unwrap();
        assert_eq!(packet.main, 0xF3);
        assert_eq!(packet.sub, SubCode::Code(0x00));
        assert_eq!(packet.body.as_ref(), &[0x01, b'A', b'D', b'M']);
    }

    #[test]
    fn large_body_selects_c2_with_big_endian_length() {
        let mut codec = FrameCodec::plain();
        let mut wire = BytesMut::new();
        let body = vec![0xAB; 600];
        codec
            .encode(OutboundFrame::new(0x12, body.clone()), &mut wire)
            .unwrap();
        assert_eq!(wire[0], 0xC2);
        let length = u16::from_be_bytes([wire[1], wire[2]]) as usize;
        assert_eq!(length, wire.len());

        let frames = decode_all(&mut codec, &wire);
        assert_eq!(frames[0].kind, FrameKind::C2);
        assert_eq!(frames[0].payload.as_ref(), &body[..]);
    }

    #[test]
    fn partial_frames_are_retained_until_complete() {
        let mut codec = FrameCodec::plain();
        let mut wire = BytesMut::new();
        codec
            .encode(OutboundFrame::new(0x15, vec![100, 120]), &mut wire)
            .unwrap();

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&wire[..3]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&wire[3..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.code, 0x15);
        assert_eq!(frame.payload.as_ref(), &[100, 120]);
    }

    #[test]
    fn two_frames_in_one_read_decode_in_order() {
        let mut codec = FrameCodec::plain();
        let mut wire = BytesMut::new();
        codec.encode(OutboundFrame::new(0x15, vec![1, 2]), &mut wire).unwrap();
        codec.encode(OutboundFrame::new(0x18, vec![3]), &mut wire).unwrap();
        let frames = decode_all(&mut codec, &wire);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].code, 0x15);
        assert_eq!(frames[1].code, 0x18);
    }

    #[test]
    fn unknown_type_byte_is_fatal() {
        let mut codec = FrameCodec::plain();
        let mut buf = BytesMut::from(&[0x7F, 0x03, 0x00][..]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn undersized_length_is_fatal() {
        let mut codec = FrameCodec::plain();
        let mut buf = BytesMut::from(&[0xC1, 0x02, 0x00][..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::FrameLengthOutOfBounds { .. }));
    }

    #[test]
    fn oversized_length_is_fatal() {
        let mut codec = FrameCodec::plain();
        // C2 header claiming 0x4000 bytes, over the 8 KiB cap.
        let mut buf = BytesMut::from(&[0xC2, 0x40, 0x00, 0x00][..]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::FrameLengthOutOfBounds { .. }));
    }

    #[test]
    fn client_to_server_encryption_round_trips() {
        let mut client = FrameCodec::encrypted(Side::Client);
        let mut server = FrameCodec::encrypted(Side::Server);

        let mut wire = BytesMut::new();
        client
            .encode(OutboundFrame::new(0xF1, vec![0x01, 0xAA, 0xBB, 0xCC]), &mut wire)
            .unwrap();
        assert_eq!(wire[0], 0xC3);
        // Ciphertext grows: 5 plaintext bytes become one 11-byte block.
        assert_eq!(wire.len(), 2 + 11);

        let frames = decode_all(&mut server, &wire);
        assert_eq!(frames[0].kind, FrameKind::C3);
        assert_eq!(frames[0].code, 0xF1);
        assert_eq!(frames[0].payload.as_ref(), &[0x01, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn server_to_client_encryption_round_trips() {
        let mut server = FrameCodec::encrypted(Side::Server);
        let mut client = FrameCodec::encrypted(Side::Client);

        let body: Vec<u8> = (0..40).collect();
        let mut wire = BytesMut::new();
        server
            .encode(OutboundFrame::new(0x12, body.clone()), &mut wire)
            .unwrap();

        let frames = decode_all(&mut client, &wire);
        assert_eq!(frames[0].code, 0x12);
        assert_eq!(frames[0].payload.as_ref(), &body[..]);
    }

    #[test]
    fn plain_override_skips_encryption() {
        let mut client = FrameCodec::encrypted(Side::Client);
        let mut wire = BytesMut::new();
        client
            .encode(OutboundFrame::plain(0x22, vec![0x12, 0x34]), &mut wire)
            .unwrap();
        assert_eq!(wire.as_ref(), &[0xC1, 0x05, 0x22, 0x12, 0x34]);
    }

    #[test]
    fn corrupted_ciphertext_is_fatal() {
        let mut server = FrameCodec::encrypted(Side::Server);
        let mut client = FrameCodec::encrypted(Side::Client);
        let mut wire = BytesMut::new();
        server
            .encode(OutboundFrame::new(0x26, vec![0xFF, 0x00, 0x64]), &mut wire)
            .unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        let mut buf = BytesMut::from(&wire[..]);
        assert!(client.decode(&mut buf).is_err());
    }
}
