//! Runtime configuration.

use std::path::PathBuf;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "pasteburn.redb";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings resolved from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Path to the redb database file
    pub db_path: PathBuf,
    /// Log filter directive (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { db_path: PathBuf::from(DEFAULT_DB_PATH), log_level: DEFAULT_LOG_LEVEL.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.db_path, PathBuf::from("pasteburn.redb"));
        assert_eq!(config.log_level, "info");
    }
}
