//! In-memory account repository.
//!
//! Used by tests and embedders that need the repository contract without a
//! database file. Behaves like `SqliteAccountRepository`: ids are never
//! reused, `created_at` never steps back, and empty required text fields
//! are rejected as constraint violations.

use crate::model::account::{Account, AccountId, CreateAccountParams, UpdateAccountParams};
use crate::repo::account_repo::{AccountListQuery, AccountRepository, RepoError, RepoResult};
use crate::repo::now_epoch_ms;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: AccountId,
    last_created_at: i64,
    rows: BTreeMap<AccountId, Account>,
}

/// Thread-safe account store backed by an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts currently present.
    pub fn len(&self) -> usize {
        self.state().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every mutation completes before the guard drops, so a poisoned lock
    // still protects consistent state.
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn create_account(&self, params: &CreateAccountParams) -> RepoResult<Account> {
        if let Some(field) = params.first_empty_field() {
            return Err(RepoError::ConstraintViolation(format!(
                "CHECK constraint failed: length({field}) > 0"
            )));
        }

        let mut state = self.state();
        let id = state.last_id + 1;
        let created_at = now_epoch_ms().max(state.last_created_at);
        let account = Account {
            id,
            owner: params.owner.clone(),
            balance: params.balance,
            currency: params.currency.clone(),
            merchant_name: params.merchant_name.clone(),
            created_at,
        };

        state.last_id = id;
        state.last_created_at = created_at;
        state.rows.insert(id, account.clone());
        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Account> {
        self.state()
            .rows
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound(id))
    }

    fn update_account(&self, params: &UpdateAccountParams) -> RepoResult<Account> {
        let mut state = self.state();
        let account = state
            .rows
            .get_mut(&params.id)
            .ok_or(RepoError::NotFound(params.id))?;
        account.balance = params.balance;
        Ok(account.clone())
    }

    fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        self.state()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }

    fn list_accounts(&self, query: &AccountListQuery) -> RepoResult<Vec<Account>> {
        query.validate()?;

        // validate() guarantees both values are non-negative.
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        Ok(self
            .state()
            .rows
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
