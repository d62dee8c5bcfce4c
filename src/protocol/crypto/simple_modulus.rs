//! SimpleModulus block cipher.
//!
//! Operates on 8-byte plaintext blocks that encrypt to 11-byte ciphertext
//! blocks. A block holds four little-endian 16-bit values; each is xor-mixed
//! with a key word and the previous ciphertext value, multiplied by a
//! per-slot multiplier and reduced modulo a per-slot modulus. The result can
//! exceed 16 bits, so the ninth byte collects the two overflow bits of every
//! slot. Byte nine carries the plaintext byte count of the block (xor 0x3D)
//! and byte ten an xor-fold checksum seeded with 0xF8.
//!
//! Encrypt and decrypt multipliers are modular inverses per slot:
//! `encrypt[i] * decrypt[i] % modulus[i] == 1`.

use crate::common::error::{ProtocolError, ProtocolResult};

/// Plaintext block size in bytes.
pub const DECRYPTED_BLOCK_SIZE: usize = 8;
/// Ciphertext block size in bytes.
pub const ENCRYPTED_BLOCK_SIZE: usize = 11;

const COUNT_XOR: u8 = 0x3D;
const CHECKSUM_SEED: u8 = 0xF8;

/// One directional key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySet {
    pub modulus: [u32; 4],
    pub xor: [u16; 4],
    pub encrypt: [u32; 4],
    pub decrypt: [u32; 4],
}

impl KeySet {
    /// Bundled key set for client-to-server traffic.
    pub const fn client_to_server() -> Self {
        Self {
            modulus: [130_242, 125_248, 142_032, 129_342],
            xor: [0x3D91, 0x56F6, 0x2CC3, 0x5A42],
            encrypt: [937, 499, 821, 613],
            decrypt: [139, 251, 173, 211],
        }
    }

    /// Bundled key set for server-to-client traffic.
    pub const fn server_to_client() -> Self {
        Self {
            modulus: [128_422, 130_452, 143_026, 127_552],
            xor: [0x6A1F, 0x1C5D, 0x4F83, 0x73B6],
            encrypt: [769, 683, 911, 557],
            decrypt: [167, 191, 157, 229],
        }
    }
}

/// Cipher instance bound to one key set.
#[derive(Debug, Clone)]
pub struct SimpleModulus {
    keys: KeySet,
}

impl SimpleModulus {
    pub fn new(keys: KeySet) -> Self {
        Self { keys }
    }

    /// Ciphertext length for a given plaintext length.
    pub fn encrypted_len(plaintext_len: usize) -> usize {
        plaintext_len.div_ceil(DECRYPTED_BLOCK_SIZE) * ENCRYPTED_BLOCK_SIZE
    }

    /// Encrypt a byte stream. The final block records its plaintext byte
    /// count, so decryption recovers the exact input length.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encrypted_len(plaintext.len()));
        for chunk in plaintext.chunks(DECRYPTED_BLOCK_SIZE) {
            let mut block = [0u8; ENCRYPTED_BLOCK_SIZE];
            self.encode_block(chunk, &mut block);
            out.extend_from_slice(&block);
        }
        out
    }

    /// Decrypt a byte stream produced by [`SimpleModulus::encrypt`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> ProtocolResult<Vec<u8>> {
        if ciphertext.is_empty() || ciphertext.len() % ENCRYPTED_BLOCK_SIZE != 0 {
            return Err(ProtocolError::Decryption {
                message: format!(
                    "ciphertext length {} is not a multiple of {}",
                    ciphertext.len(),
                    ENCRYPTED_BLOCK_SIZE
                ),
            });
        }

        let mut out = Vec::with_capacity(ciphertext.len() / ENCRYPTED_BLOCK_SIZE * DECRYPTED_BLOCK_SIZE);
        for block in ciphertext.chunks(ENCRYPTED_BLOCK_SIZE) {
            self.decode_block(block, &mut out)?;
        }
        Ok(out)
    }

    fn encode_block(&self, plain: &[u8], out: &mut [u8; ENCRYPTED_BLOCK_SIZE]) {
        debug_assert!(!plain.is_empty() && plain.len() <= DECRYPTED_BLOCK_SIZE);

        let mut padded = [0u8; DECRYPTED_BLOCK_SIZE];
        padded[..plain.len()].copy_from_slice(plain);

        let mut prev: u32 = 0;
        let mut high_bits = 0u8;
        for i in 0..4 {
            let value = u16::from_le_bytes([padded[2 * i], padded[2 * i + 1]]);
            let mixed = (value ^ self.keys.xor[i] ^ (prev as u16)) as u64;
            let enc = (mixed * self.keys.encrypt[i] as u64 % self.keys.modulus[i] as u64) as u32;
            out[2 * i..2 * i + 2].copy_from_slice(&(enc as u16).to_le_bytes());
            high_bits |= (((enc >> 16) & 0x03) as u8) << (i * 2);
            prev = enc;
        }
        out[8] = high_bits;
        out[9] = plain.len() as u8 ^ COUNT_XOR;
        out[10] = out[..10].iter().fold(CHECKSUM_SEED, |acc, b| acc ^ b);
    }

    fn decode_block(&self, block: &[u8], out: &mut Vec<u8>) -> ProtocolResult<()> {
        let checksum = block[..10].iter().fold(CHECKSUM_SEED, |acc, b| acc ^ b);
        if checksum != block[10] {
            return Err(ProtocolError::Decryption {
                message: "block checksum mismatch".into(),
            });
        }

        let count = (block[9] ^ COUNT_XOR) as usize;
        if count == 0 || count > DECRYPTED_BLOCK_SIZE {
            return Err(ProtocolError::Decryption {
                message: format!("invalid block byte count {count}"),
            });
        }

        let mut prev: u32 = 0;
        let mut plain = [0u8; DECRYPTED_BLOCK_SIZE];
        for i in 0..4 {
            let low = u16::from_le_bytes([block[2 * i], block[2 * i + 1]]) as u32;
            let enc = low | ((((block[8] >> (i * 2)) & 0x03) as u32) << 16);
            if enc >= self.keys.modulus[i] {
                return Err(ProtocolError::Decryption {
                    message: format!("block value {enc} exceeds modulus"),
                });
            }
            let mixed = (enc as u64 * self.keys.decrypt[i] as u64 % self.keys.modulus[i] as u64) as u16;
            let value = mixed ^ self.keys.xor[i] ^ (prev as u16);
            plain[2 * i..2 * i + 2].copy_from_slice(&value.to_le_bytes());
            prev = enc;
        }
        out.extend_from_slice(&plain[..count]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_multipliers_are_modular_inverses() {
        for keys in [KeySet::client_to_server(), KeySet::server_to_client()] {
            for i in 0..4 {
                let product = keys.encrypt[i] as u64 * keys.decrypt[i] as u64;
                assert_eq!(
                    product % keys.modulus[i] as u64,
                    1,
                    "slot {} of {:?}",
                    i,
                    keys
                );
            }
        }
    }

    #[test]
    fn round_trips_every_partial_block_length() {
        let cipher = SimpleModulus::new(KeySet::client_to_server());
        let data: Vec<u8> = (0u8..=255).collect();
        for len in 1..=24 {
            let plain = &data[..len];
            let encrypted = cipher.encrypt(plain);
            assert_eq!(encrypted.len(), SimpleModulus::encrypted_len(len));
            let decrypted = cipher.decrypt(&encrypted).unwrap();
            assert_eq!(decrypted, plain, "length {len}");
        }
    }

    #[test]
    fn round_trips_with_server_keys() {
        let cipher = SimpleModulus::new(KeySet::server_to_client());
        let plain = b"\x01\x41\x44\x4D\x00\xFF\x10\x20\x30";
        let decrypted = cipher.decrypt(&cipher.encrypt(plain)).unwrap();
        assert_eq!(decrypted, plain);
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let cipher = SimpleModulus::new(KeySet::client_to_server());
        let mut encrypted = cipher.encrypt(b"hello world");
        encrypted.pop();
        assert!(cipher.decrypt(&encrypted).is_err());
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let cipher = SimpleModulus::new(KeySet::client_to_server());
        let mut encrypted = cipher.encrypt(b"hello world");
        encrypted[10] ^= 0x01;
        let err = cipher.decrypt(&encrypted).unwrap_err();
        assert!(err.to_string().contains("checksum"), "got: {err}");
    }

    #[test]
    fn rejects_value_exceeding_modulus() {
        let cipher = SimpleModulus::new(KeySet::client_to_server());
        let mut encrypted = cipher.encrypt(b"12345678");
        // Force all overflow bits on and repair the checksum so only the
        // range check can reject the block.
        encrypted[8] = 0xFF;
        encrypted[10] = encrypted[..10].iter().fold(CHECKSUM_SEED, |acc, b| acc ^ b);
        let err = cipher.decrypt(&encrypted).unwrap_err();
        assert!(err.to_string().contains("modulus"), "got: {err}");
    }

    #[test]
    fn different_directions_do_not_interoperate() {
        let client = SimpleModulus::new(KeySet::client_to_server());
        let server = SimpleModulus::new(KeySet::server_to_client());
        let encrypted = client.encrypt(b"credentials");
        match server.decrypt(&encrypted) {
            Err(_) => {}
            Ok(decrypted) => assert_ne!(decrypted, b"credentials"),
        }
    }
}
