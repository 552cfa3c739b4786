//! Account record storage for a ledger-style application.
//! Persists monetary accounts and exposes a narrow repository contract over
//! SQLite or memory.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, CreateAccountParams, UpdateAccountParams};
pub use repo::account_repo::{
    AccountListQuery, AccountRepository, RepoError, RepoResult, SqliteAccountRepository,
    NO_ROWS_MESSAGE,
};
pub use repo::memory_repo::InMemoryAccountRepository;
pub use service::account_service::{error_code, AccountService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
