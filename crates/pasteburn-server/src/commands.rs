//! Subcommands and the JSON-lines batch loop.
//!
//! Every command builds one of the typed requests from
//! [`pasteburn_core::api`], runs it against a [`SecretStore`], and writes the
//! response as a single JSON line.

use std::io::{BufRead, Write};

use base64::{Engine, engine::general_purpose::STANDARD};
use clap::Subcommand;
use pasteburn_core::{
    SecretStore,
    api::{
        CreateDocumentRequest, CreateMultiDocumentRequest, ReadDocumentRequest,
        ReadMultiDocumentRequest,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CliError;

/// Operations exposed on the command line.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encrypt and store a single-reader secret
    Create {
        /// Secret text
        #[arg(long)]
        body: String,
        /// 32-byte key, base64
        #[arg(long)]
        key: String,
    },
    /// Read (and destroy) a single-reader secret
    Read {
        /// Document id
        #[arg(long)]
        id: Uuid,
        /// 32-byte key, base64
        #[arg(long)]
        key: String,
    },
    /// Encrypt one secret for several recipients
    Share {
        /// Secret text
        #[arg(long)]
        body: String,
        /// Number of recipients (1-255)
        #[arg(long)]
        recipients: u8,
    },
    /// Read (and destroy) one recipient's copy
    Resolve {
        /// Group id
        #[arg(long)]
        id: Uuid,
        /// Recipient index
        #[arg(long)]
        index: u8,
        /// That recipient's key, base64
        #[arg(long)]
        key: String,
    },
    /// Read JSON requests from stdin, one per line
    Batch,
}

/// A request line in batch mode.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Create a single-reader document
    CreateDocument(CreateDocumentRequest),
    /// Read a single-reader document
    ReadDocument(ReadDocumentRequest),
    /// Create a multi-recipient document
    CreateMultiDocument(CreateMultiDocumentRequest),
    /// Read one recipient's copy
    ReadMultiDocument(ReadMultiDocumentRequest),
}

/// Error line written in batch mode.
#[derive(Debug, Serialize)]
struct ErrorLine {
    error: String,
    client_error: bool,
}

impl Request {
    /// Validate and run, serializing the response.
    pub fn execute(&self, store: &impl SecretStore) -> Result<String, CliError> {
        let json = match self {
            Self::CreateDocument(request) => serde_json::to_string(&request.execute(store)?)?,
            Self::ReadDocument(request) => serde_json::to_string(&request.execute(store)?)?,
            Self::CreateMultiDocument(request) => serde_json::to_string(&request.execute(store)?)?,
            Self::ReadMultiDocument(request) => serde_json::to_string(&request.execute(store)?)?,
        };
        Ok(json)
    }
}

impl Command {
    /// Run the command, writing JSON to `output`.
    ///
    /// In batch mode a failing line produces an error object and the loop
    /// continues; only I/O failures end it.
    pub fn run(
        self,
        store: &impl SecretStore,
        input: impl BufRead,
        mut output: impl Write,
    ) -> Result<(), CliError> {
        let request = match self {
            Self::Create { body, key } => {
                Request::CreateDocument(CreateDocumentRequest {
                    body: body.into_bytes(),
                    key: decode_key(&key)?,
                })
            },
            Self::Read { id, key } => {
                Request::ReadDocument(ReadDocumentRequest { id, key: decode_key(&key)? })
            },
            Self::Share { body, recipients } => {
                Request::CreateMultiDocument(CreateMultiDocumentRequest {
                    body: body.into_bytes(),
                    recipients,
                })
            },
            Self::Resolve { id, index, key } => {
                Request::ReadMultiDocument(ReadMultiDocumentRequest {
                    id,
                    index,
                    key: decode_key(&key)?,
                })
            },
            Self::Batch => return run_batch(store, input, output),
        };

        writeln!(output, "{}", request.execute(store)?)?;
        Ok(())
    }
}

fn run_batch(
    store: &impl SecretStore,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<(), CliError> {
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = serde_json::from_str::<Request>(&line)
            .map_err(CliError::from)
            .and_then(|request| request.execute(store));

        let json = match result {
            Ok(json) => json,
            Err(e) => {
                warn!(line = number + 1, error = %e, "batch request failed");
                serde_json::to_string(&ErrorLine {
                    error: e.to_string(),
                    client_error: e.is_client_error(),
                })?
            },
        };

        writeln!(output, "{json}")?;
    }

    output.flush()?;
    debug!("batch input exhausted");
    Ok(())
}

fn decode_key(key: &str) -> Result<Vec<u8>, CliError> {
    Ok(STANDARD.decode(key.trim())?)
}
