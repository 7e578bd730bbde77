//! Pasteburn operator CLI.
//!
//! # Usage
//!
//! ```bash
//! # Store a secret under a caller-chosen key
//! pasteburn create --body "hunter2" --key "$(head -c32 /dev/urandom | base64)"
//!
//! # Read it back (once)
//! pasteburn read --id <uuid> --key <base64>
//!
//! # Fan out to three recipients, then read recipient 1's copy
//! pasteburn share --body "hunter2" --recipients 3
//! pasteburn resolve --id <uuid> --index 1 --key <base64>
//!
//! # Drive the JSON request schema from stdin
//! echo '{"op":"read_document","id":"...","key":"..."}' | pasteburn batch
//! ```
//!
//! Responses go to stdout as JSON lines; logs go to stderr.

mod commands;
mod config;
mod error;

use std::{io, path::PathBuf};

use clap::Parser;
use pasteburn_core::{DocumentService, RedbStorage};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{commands::Command, config::ServiceConfig};

/// Pasteburn one-time secret store
#[derive(Parser, Debug)]
#[command(name = "pasteburn")]
#[command(about = "Encrypted secrets that burn after reading")]
#[command(version)]
struct Args {
    /// Path to the database file
    #[arg(long, env = "PASTEBURN_DB", default_value = config::DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = config::DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    fn config(&self) -> ServiceConfig {
        ServiceConfig { db_path: self.db.clone(), log_level: self.log_level.clone() }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.config();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    tracing::debug!(db = %config.db_path.display(), "opening store");
    let storage = RedbStorage::open(&config.db_path)?;
    let service = DocumentService::new(storage);

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = args.command.run(&service, stdin.lock(), stdout.lock()) {
        tracing::error!(error = %e, client_error = e.is_client_error(), "command failed");
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_db_and_subcommand() {
        let args = Args::try_parse_from([
            "pasteburn",
            "--db",
            "/tmp/x.redb",
            "share",
            "--body",
            "secret",
            "--recipients",
            "3",
        ])
        .unwrap();

        assert_eq!(args.config().db_path, PathBuf::from("/tmp/x.redb"));
        assert_eq!(args.config().log_level, "info");
        assert!(matches!(args.command, Command::Share { recipients: 3, .. }));
    }

    #[test]
    fn rejects_too_many_recipients() {
        let result = Args::try_parse_from([
            "pasteburn",
            "share",
            "--body",
            "secret",
            "--recipients",
            "256",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn store_opened_from_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig { db_path: dir.path().join("cli.redb"), ..Default::default() };

        let service = DocumentService::new(RedbStorage::open(&config.db_path).unwrap());
        let mut output = Vec::new();
        Command::Share { body: "secret".to_string(), recipients: 1 }
            .run(&service, io::empty(), &mut output)
            .unwrap();

        assert!(config.db_path.exists());
        assert!(!output.is_empty());
    }
}
