//! Storage error types.
//!
//! Defines errors that can occur during storage operations:
//! - `AlreadyExists`: Write-once violation (identifier already holds a value)
//! - `EmptyValue`: Empty contents would be indistinguishable from "consumed"
//! - `Io`: Underlying storage system errors

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Identifier already holds a value
    ///
    /// Documents and groups are write-once. Saving twice under the same
    /// identifier is rejected rather than silently replacing unread
    /// ciphertext.
    #[error("already exists: {id}")]
    AlreadyExists {
        /// Document or group identifier
        id: Uuid,
    },

    /// Attempted to store an empty value
    #[error("refusing to store empty value for {id}")]
    EmptyValue {
        /// Document or group identifier
        id: Uuid,
    },

    /// I/O error (file system, database, transaction commit, etc.)
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}
