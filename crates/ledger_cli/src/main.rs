//! `ledger` command-line front end for the account store.
//!
//! Every subcommand opens the configured SQLite database, runs one
//! repository operation and prints the result as JSON on stdout.

use clap::{Parser, Subcommand};
use ledger_core::db::DbError;
use ledger_core::{
    error_code, AccountListQuery, AccountService, RepoError, SqliteAccountRepository, StoreConfig,
};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "ledger", version, about = "Manage persisted ledger accounts")]
struct Cli {
    /// SQLite database file. Defaults to `LEDGER_DB_PATH` or the temp dir.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account
    Create {
        #[arg(long)]
        owner: String,
        #[arg(long, allow_negative_numbers = true)]
        balance: i64,
        #[arg(long)]
        currency: String,
        #[arg(long)]
        merchant: String,
    },
    /// Show one account
    Get { id: i64 },
    /// Replace an account balance
    Update {
        id: i64,
        #[arg(long, allow_negative_numbers = true)]
        balance: i64,
    },
    /// Delete an account
    Delete { id: i64 },
    /// List accounts ordered by id
    List {
        #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
        limit: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },
}

#[derive(Debug, Serialize)]
struct Deleted {
    deleted: i64,
}

/// Failure of one CLI command.
#[derive(Debug)]
enum CliError {
    Repo(RepoError),
    Output(serde_json::Error),
}

impl CliError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_not_found())
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Repo(err) => error_code(err),
            Self::Output(_) => "output_failed",
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to encode output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Repo(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = StoreConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Err(err) = config.init_logging() {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(&config, cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error error_code={}", err.code());
            eprintln!("error: {err}");
            if err.is_not_found() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(config: &StoreConfig, command: Command) -> Result<String, CliError> {
    let conn = config.open_db()?;
    let service = AccountService::new(SqliteAccountRepository::try_new(&conn)?);

    let output = match command {
        Command::Create {
            owner,
            balance,
            currency,
            merchant,
        } => to_json(&service.open_account(&owner, balance, &currency, &merchant)?),
        Command::Get { id } => to_json(&service.get_account(id)?),
        Command::Update { id, balance } => to_json(&service.set_balance(id, balance)?),
        Command::Delete { id } => {
            service.delete_account(id)?;
            to_json(&Deleted { deleted: id })
        }
        Command::List { limit, offset } => {
            to_json(&service.list_accounts(&AccountListQuery::new(limit, offset))?)
        }
    }?;
    Ok(output)
}

fn to_json(value: &impl Serialize) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::{run, to_json, Cli, CliError, Command};
    use clap::{CommandFactory, Parser};
    use ledger_core::StoreConfig;
    use serde::ser::Error as _;
    use serde::{Serialize, Serializer};

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("bad \"quoted\" value"))
        }
    }

    fn temp_config(dir: &tempfile::TempDir) -> StoreConfig {
        StoreConfig {
            db_path: dir.path().join("ledger.db"),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_accepts_negative_balance() {
        let cli = Cli::try_parse_from([
            "ledger", "create", "--owner", "bob", "--balance", "-250", "--currency", "EUR",
            "--merchant", "shop2",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Create { balance: -250, .. }));
    }

    #[test]
    fn run_creates_then_reports_missing_after_delete() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);

        let created = run(
            &config,
            Command::Create {
                owner: "alice".to_string(),
                balance: 1000,
                currency: "USD".to_string(),
                merchant: "shop1".to_string(),
            },
        )
        .unwrap();
        let account: serde_json::Value = serde_json::from_str(&created).unwrap();
        let id = account["id"].as_i64().unwrap();
        assert_eq!(account["owner"], "alice");

        run(&config, Command::Delete { id }).unwrap();
        let err = run(&config, Command::Get { id }).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn run_rejects_invalid_list_window() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&temp_config(&dir), Command::List { limit: 0, offset: 0 }).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn encoding_failure_is_an_error_not_hand_built_json() {
        let err: CliError = to_json(&Unencodable).unwrap_err().into();
        assert_eq!(err.code(), "output_failed");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("bad \"quoted\" value"));
    }
}
