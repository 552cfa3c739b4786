//! Account repository contract, error taxonomy and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list over the `accounts` table.
//! - Translate SQLite failures into the store error taxonomy.
//!
//! # Invariants
//! - Every operation is one SQL statement, so it is atomic per record.
//! - `update_account` writes `balance` only and never inserts.
//! - `list_accounts` orders by `id ASC`, a total order.
//! - Deleting a missing `id` reports `NotFound`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::account::{Account, AccountId, CreateAccountParams, UpdateAccountParams};
use crate::repo::now_epoch_ms;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text of every `NotFound` error, shared with callers that map errors by
/// message.
pub const NO_ROWS_MESSAGE: &str = "no rows in result set";

const ACCOUNT_COLUMNS: &str = "id, owner, balance, currency, merchant_name, created_at";

const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "owner",
    "balance",
    "currency",
    "merchant_name",
    "created_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced by account repositories. Nothing is retried internally.
#[derive(Debug)]
pub enum RepoError {
    /// No account row has the requested id.
    NotFound(AccountId),
    /// Input violates a storage-level constraint.
    ConstraintViolation(String),
    /// Caller-supplied pagination parameters are out of range.
    InvalidArgument(String),
    /// The storage engine failed or could not be reached.
    StoreUnavailable(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted into an `Account`.
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the failure is infrastructure-level and may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(_) => f.write_str(NO_ROWS_MESSAGE),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::StoreUnavailable(err) => write!(f, "account store unavailable: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted account data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::StoreUnavailable(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(message.unwrap_or_else(|| failure.to_string()))
            }
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => Self::InvalidData(value.to_string()),
            other => Self::StoreUnavailable(DbError::Sqlite(other)),
        }
    }
}

/// Pagination window for `list_accounts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountListQuery {
    /// Maximum rows to return. Must be positive.
    pub limit: i64,
    /// Rows to skip before the window. Must be non-negative.
    pub offset: i64,
}

impl AccountListQuery {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn validate(&self) -> RepoResult<()> {
        if self.limit <= 0 {
            return Err(RepoError::InvalidArgument(format!(
                "limit must be positive, got {}",
                self.limit
            )));
        }
        if self.offset < 0 {
            return Err(RepoError::InvalidArgument(format!(
                "offset must not be negative, got {}",
                self.offset
            )));
        }
        Ok(())
    }
}

/// Repository interface for account CRUD operations.
pub trait AccountRepository {
    fn create_account(&self, params: &CreateAccountParams) -> RepoResult<Account>;
    fn get_account(&self, id: AccountId) -> RepoResult<Account>;
    fn update_account(&self, params: &UpdateAccountParams) -> RepoResult<Account>;
    fn delete_account(&self, id: AccountId) -> RepoResult<()>;
    fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>>;
}

impl<R: AccountRepository + ?Sized> AccountRepository for &R {
    fn create_account(&self, params: &CreateAccountParams) -> RepoResult<Account> {
        (**self).create_account(params)
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Account> {
        (**self).get_account(id)
    }

    fn update_account(&self, params: &UpdateAccountParams) -> RepoResult<Account> {
        (**self).update_account(params)
    }

    fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        (**self).delete_account(id)
    }

    fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>> {
        (**self).list_accounts(query)
    }
}

/// SQLite-backed account repository over a caller-provided connection.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Creates a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` is not current.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` for a malformed schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_accounts_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, params: &CreateAccountParams) -> RepoResult<Account> {
        // created_at never steps back behind any value handed out before,
        // even if the wall clock does or the newest row was deleted.
        let account = self.conn.query_row(
            &format!(
                "INSERT INTO accounts (owner, balance, currency, merchant_name, created_at)
                 VALUES (
                    ?1, ?2, ?3, ?4,
                    MAX(?5, COALESCE((SELECT last_created_at FROM account_clock WHERE id = 1), 0))
                 )
                 RETURNING {ACCOUNT_COLUMNS};"
            ),
            params![
                params.owner.as_str(),
                params.balance,
                params.currency.as_str(),
                params.merchant_name.as_str(),
                now_epoch_ms(),
            ],
            parse_account_row,
        )?;
        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Account> {
        self.conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1;"),
                [id],
                parse_account_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(id))
    }

    fn update_account(&self, params: &UpdateAccountParams) -> RepoResult<Account> {
        self.conn
            .query_row(
                &format!(
                    "UPDATE accounts SET balance = ?2 WHERE id = ?1 RETURNING {ACCOUNT_COLUMNS};"
                ),
                params![params.id, params.balance],
                parse_account_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(params.id))
    }

    fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM accounts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>> {
        query.validate()?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS}
             FROM accounts
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let accounts = stmt
            .query_map(params![query.limit, query.offset], parse_account_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(accounts)
    }
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get("id")?,
        owner: row.get("owner")?,
        balance: row.get("balance")?,
        currency: row.get("currency")?,
        merchant_name: row.get("merchant_name")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_accounts_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "accounts")? {
        return Err(RepoError::MissingRequiredTable("accounts"));
    }

    let columns = table_columns(conn, "accounts")?;
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !columns.iter().any(|present| present.as_str() == *column))
    {
        return Err(RepoError::MissingRequiredColumn {
            table: "accounts",
            column,
        });
    }

    if !table_exists(conn, "account_clock")? {
        return Err(RepoError::MissingRequiredTable("account_clock"));
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}
