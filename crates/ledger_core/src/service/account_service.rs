//! Account use-case service.
//!
//! # Responsibility
//! - Provide stable account entry points for core callers.
//! - Normalize text input and emit metadata-only operation logs.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Repository errors are returned unchanged; nothing is retried.
//! - Logs carry ids and error kinds only, never owner or merchant names.

use crate::model::account::{Account, AccountId, CreateAccountParams, UpdateAccountParams};
use crate::repo::account_repo::{AccountListQuery, AccountRepository, RepoError, RepoResult};
use log::{debug, info, warn};
use std::time::Instant;

/// Use-case service wrapper for account operations.
pub struct AccountService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Opens an account after trimming surrounding whitespace from text fields.
    ///
    /// Fields that are blank after trimming surface as `ConstraintViolation`
    /// from the store.
    pub fn open_account(
        &self,
        owner: &str,
        balance: i64,
        currency: &str,
        merchant_name: &str,
    ) -> RepoResult<Account> {
        let params = CreateAccountParams::new(
            owner.trim(),
            balance,
            currency.trim(),
            merchant_name.trim(),
        );
        self.create_account(&params)
    }

    pub fn create_account(&self, params: &CreateAccountParams) -> RepoResult<Account> {
        let started_at = Instant::now();
        let result = self.repo.create_account(params);
        match &result {
            Ok(account) => info!(
                "event=account_create module=service status=ok account_id={} duration_ms={}",
                account.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("account_create", None, err, started_at),
        }
        result
    }

    pub fn get_account(&self, id: AccountId) -> RepoResult<Account> {
        let started_at = Instant::now();
        let result = self.repo.get_account(id);
        match &result {
            Ok(_) => debug!(
                "event=account_get module=service status=ok account_id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("account_get", Some(id), err, started_at),
        }
        result
    }

    /// Replaces the stored balance (last writer wins).
    pub fn set_balance(&self, id: AccountId, balance: i64) -> RepoResult<Account> {
        self.update_account(&UpdateAccountParams { id, balance })
    }

    pub fn update_account(&self, params: &UpdateAccountParams) -> RepoResult<Account> {
        let started_at = Instant::now();
        let result = self.repo.update_account(params);
        match &result {
            Ok(_) => info!(
                "event=account_update module=service status=ok account_id={} duration_ms={}",
                params.id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("account_update", Some(params.id), err, started_at),
        }
        result
    }

    pub fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.repo.delete_account(id);
        match &result {
            Ok(()) => info!(
                "event=account_delete module=service status=ok account_id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("account_delete", Some(id), err, started_at),
        }
        result
    }

    pub fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>> {
        let started_at = Instant::now();
        let result = self.repo.list_accounts(query);
        match &result {
            Ok(accounts) => debug!(
                "event=account_list module=service status=ok limit={} offset={} returned={} duration_ms={}",
                query.limit,
                query.offset,
                accounts.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("account_list", None, err, started_at),
        }
        result
    }
}

fn log_failure(event: &str, id: Option<AccountId>, err: &RepoError, started_at: Instant) {
    let account_id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    warn!(
        "event={event} module=service status=error account_id={account_id} error_code={} duration_ms={}",
        error_code(err),
        started_at.elapsed().as_millis()
    );
}

/// Stable machine-readable code for an error kind.
pub fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::NotFound(_) => "not_found",
        RepoError::ConstraintViolation(_) => "constraint_violation",
        RepoError::InvalidArgument(_) => "invalid_argument",
        RepoError::StoreUnavailable(_) => "store_unavailable",
        RepoError::UninitializedConnection { .. }
        | RepoError::MissingRequiredTable(_)
        | RepoError::MissingRequiredColumn { .. } => "schema_mismatch",
        RepoError::InvalidData(_) => "invalid_data",
    }
}
