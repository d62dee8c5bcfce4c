//! Xor32 stream obfuscation and the Xor3 credential scramble.

/// The 32-byte rolling key table.
pub const XOR32_KEY: [u8; 32] = hex_literal::hex!(
    "AB 11 CD FE 18 23 C5 A3 CA 33 C1 CC 66 67 21 F3"
    "32 12 15 35 D1 22 56 AB 40 FF B0 45 B3 23 88 99"
);

/// Three-byte rolling xor applied to the credential fields of the login
/// packet. Self-inverse.
pub const XOR3_KEY: [u8; 3] = [0xFC, 0xCF, 0xAB];

/// Self-chaining byte stream transform.
///
/// Each output byte is the input xored with the running state and the key
/// table; the state is then replaced by the plaintext byte. State starts at
/// zero for every frame, so encrypt and decrypt stay in lockstep without any
/// shared connection state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Xor32;

impl Xor32 {
    pub fn encrypt(data: &mut [u8]) {
        let mut state = 0u8;
        for (i, byte) in data.iter_mut().enumerate() {
            let plain = *byte;
            *byte = plain ^ state ^ XOR32_KEY[i % XOR32_KEY.len()];
            state = plain;
        }
    }

    pub fn decrypt(data: &mut [u8]) {
        let mut state = 0u8;
        for (i, byte) in data.iter_mut().enumerate() {
            let plain = *byte ^ state ^ XOR32_KEY[i % XOR32_KEY.len()];
            *byte = plain;
            state = plain;
        }
    }
}

/// Scramble (or unscramble) a credential buffer in place.
pub fn xor3(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= XOR3_KEY[i % XOR3_KEY.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor32_round_trips() {
        let original: Vec<u8> = (0u8..=255).collect();
        let mut data = original.clone();
        Xor32::encrypt(&mut data);
        assert_ne!(data, original);
        Xor32::decrypt(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn xor32_chains_on_plaintext() {
        // Two identical plaintext bytes must not produce a predictable
        // ciphertext pattern independent of position.
        let mut data = [0x55u8; 4];
        Xor32::encrypt(&mut data);
        assert_eq!(data[0], 0x55 ^ XOR32_KEY[0]);
        assert_eq!(data[1], 0x55 ^ 0x55 ^ XOR32_KEY[1]);
    }

    #[test]
    fn xor32_state_resets_per_call() {
        let mut first = *b"walk";
        let mut second = *b"walk";
        Xor32::encrypt(&mut first);
        Xor32::encrypt(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn xor3_is_self_inverse() {
        let mut data = *b"TestUser\0\0";
        xor3(&mut data);
        assert_ne!(&data, b"TestUser\0\0");
        xor3(&mut data);
        assert_eq!(&data, b"TestUser\0\0");
    }
}
