//! Environment-driven store configuration.
//!
//! | Variable           | Meaning                          | Default                              |
//! |--------------------|----------------------------------|--------------------------------------|
//! | `LEDGER_DB_PATH`   | SQLite database file             | `$TMPDIR/ledger_accounts.sqlite3`    |
//! | `LEDGER_LOG_LEVEL` | `trace` through `error`          | `debug` (debug build), `info`        |
//! | `LEDGER_LOG_DIR`   | absolute log directory           | unset: file logging stays disabled   |

use crate::db::{open_db, DbResult};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "LEDGER_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "LEDGER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "LEDGER_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "ledger_accounts.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    pub fn init_logging(&self) -> Result<(), String> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, &dir.to_string_lossy()),
            None => Ok(()),
        }
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}
