//! Fuzz target for the decrypt path
//!
//! # Strategy
//!
//! - Random bytes: arbitrary length, alignment and padding
//! - Bit flips: valid ciphertext with one byte corrupted
//! - Truncation: valid ciphertext cut at an arbitrary point
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - Valid ciphertext under the right key round-trips exactly
//! - Truncated or misaligned input is rejected

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pasteburn_crypto::{BLOCK_SIZE, CipherError, IV_SIZE, decrypt, encrypt_with_iv};

#[derive(Debug, Clone, Arbitrary)]
enum DecryptAttack {
    RandomBytes { key: [u8; 32], bytes: Vec<u8> },
    BitFlip { key: [u8; 32], iv: [u8; 16], plaintext: Vec<u8>, position: u16, mask: u8 },
    Truncate { key: [u8; 32], iv: [u8; 16], plaintext: Vec<u8>, cut: u16 },
    WrongKeyLength { key: Vec<u8>, bytes: Vec<u8> },
}

fuzz_target!(|attack: DecryptAttack| {
    match attack {
        DecryptAttack::RandomBytes { key, bytes } => {
            let result = decrypt(&bytes, &key);
            if bytes.len() < IV_SIZE + BLOCK_SIZE || bytes.len() % BLOCK_SIZE != 0 {
                assert!(matches!(result, Err(CipherError::CorruptCiphertext { .. })));
            }
        },
        DecryptAttack::BitFlip { key, iv, plaintext, position, mask } => {
            let Ok(mut ciphertext) = encrypt_with_iv(&plaintext, &key, iv) else {
                panic!("encrypt failed with a 32-byte key");
            };
            assert_eq!(decrypt(&ciphertext, &key).ok().as_deref(), Some(plaintext.as_slice()));

            let position = usize::from(position) % ciphertext.len();
            ciphertext[position] ^= mask;
            let _ = decrypt(&ciphertext, &key);
        },
        DecryptAttack::Truncate { key, iv, plaintext, cut } => {
            let Ok(ciphertext) = encrypt_with_iv(&plaintext, &key, iv) else {
                panic!("encrypt failed with a 32-byte key");
            };
            let cut = usize::from(cut) % ciphertext.len();
            if cut % BLOCK_SIZE != 0 || cut < IV_SIZE + BLOCK_SIZE {
                assert!(decrypt(&ciphertext[..cut], &key).is_err());
            } else {
                let _ = decrypt(&ciphertext[..cut], &key);
            }
        },
        DecryptAttack::WrongKeyLength { key, bytes } => {
            let result = decrypt(&bytes, &key);
            if key.len() != 32 {
                assert!(matches!(result, Err(CipherError::InvalidKeyLength { .. })));
            }
        },
    }
});
