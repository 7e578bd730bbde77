//! Pasteburn Cryptographic Primitives
//!
//! The cipher engine behind Pasteburn's one-time secrets. Pure functions over
//! byte buffers: no I/O, no state, no entropy source. Callers provide the IV
//! so that tests can be deterministic and production code can draw it from
//! whatever environment it runs in.
//!
//! # Wire Layout
//!
//! ```text
//! plaintext ──► pad to 16-byte multiple ──► AES-256-CBC(key, iv)
//!                                                  │
//!                                                  ▼
//!                                   [ iv: 16 bytes ][ ciphertext: n * 16 ]
//! ```
//!
//! The IV is stored in the clear in front of the ciphertext. The key never
//! appears in the output.
//!
//! # Security
//!
//! - A fresh random IV per encryption is mandatory. Reusing an IV with the
//!   same key under CBC leaks relationships between plaintexts.
//! - Padding always adds at least one byte (a full block when the input is
//!   already aligned), so the last decrypted byte always names the pad length.
//! - Malformed input is reported as [`CipherError::CorruptCiphertext`], never a
//!   panic.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod error;
mod key;
mod padding;

pub use cipher::{BLOCK_SIZE, IV_SIZE, KEY_SIZE, decrypt, encrypt_with_iv};
pub use error::CipherError;
pub use key::SecretKey;
pub use padding::{pad, unpad};
