//! Document service error types.
//!
//! Every failure reaches the immediate caller as a typed value. Nothing in the
//! core terminates the process on bad input.

use pasteburn_crypto::CipherError;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Errors from creating or reading documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Supplied key is not exactly 32 bytes
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Length of the supplied key
        actual: usize,
    },

    /// Stored bytes do not decode to IV + ciphertext + valid padding
    #[error("corrupt ciphertext: {reason}")]
    CorruptCiphertext {
        /// What was wrong with the stored bytes
        reason: String,
    },

    /// Document was never written or has already been read
    #[error("document {id} not found or already read")]
    NotFound {
        /// Document identifier
        id: Uuid,
    },

    /// Share was never written or has already been read
    #[error("share {index} of group {group_id} not found or already read")]
    ShareNotFound {
        /// Group identifier
        group_id: Uuid,
        /// Recipient index within the group
        index: u8,
    },

    /// Multi-recipient documents need at least one recipient
    #[error("invalid recipient count: {count}")]
    InvalidRecipientCount {
        /// Requested recipient count
        count: u8,
    },

    /// OS entropy source failed
    #[error("randomness unavailable: {0}")]
    Randomness(String),

    /// Backing store failed to open or commit a transaction
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DocumentError {
    /// Returns true for the "nothing to read" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ShareNotFound { .. })
    }

    /// Returns true if the caller supplied bad input.
    ///
    /// Client errors are recoverable by the caller (retry with the right key,
    /// a valid count). Server errors come from storage or entropy.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidKeyLength { .. } => true,
            Self::CorruptCiphertext { .. } => true,
            Self::NotFound { .. } => true,
            Self::ShareNotFound { .. } => true,
            Self::InvalidRecipientCount { .. } => true,

            Self::Randomness(_) => false,
            Self::Storage(_) => false,
        }
    }
}

impl From<CipherError> for DocumentError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidKeyLength { expected, actual } => {
                Self::InvalidKeyLength { expected, actual }
            },
            CipherError::CorruptCiphertext { reason } => Self::CorruptCiphertext { reason },
        }
    }
}
