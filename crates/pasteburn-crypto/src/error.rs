//! Error types for cipher operations

use thiserror::Error;

/// Errors from encryption and decryption
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Key is not exactly 32 bytes
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Length of the key that was supplied
        actual: usize,
    },

    /// Input does not decode to a valid IV + ciphertext + padding structure
    #[error("corrupt ciphertext: {reason}")]
    CorruptCiphertext {
        /// What was wrong with the input
        reason: String,
    },
}

impl CipherError {
    /// Returns true if the caller supplied bad input.
    ///
    /// Both variants are caller faults today: a wrong-length key, or bytes
    /// that were tampered with or decrypted under the wrong key.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidKeyLength { .. } => true,
            Self::CorruptCiphertext { .. } => true,
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptCiphertext { reason: reason.into() }
    }
}
