//! CLI error type.

use pasteburn_core::DocumentError;
use thiserror::Error;

/// Errors surfaced by a CLI command.
#[derive(Error, Debug)]
pub enum CliError {
    /// The document store rejected or failed the operation
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A key argument was not valid base64
    #[error("invalid base64 key: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A request line or response could not be (de)serialized
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading stdin or writing stdout failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Returns true if the caller sent a bad request.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Document(e) => e.is_client_error(),
            Self::Base64(_) | Self::Json(_) => true,
            Self::Io(_) => false,
        }
    }
}
