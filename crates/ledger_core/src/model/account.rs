//! Account domain model.
//!
//! # Responsibility
//! - Define the persisted account record and its write-path parameters.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by the store, never by callers.
//! - Only `balance` changes after creation.

use serde::{Deserialize, Serialize};

/// Store-assigned integer identity. Never reused after deletion.
pub type AccountId = i64;

/// Canonical account record as persisted in the `accounts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Account holder. Immutable after creation.
    pub owner: String,
    /// Current funds in currency minor units. May be negative.
    pub balance: i64,
    /// Short currency code, e.g. `USD`.
    pub currency: String,
    pub merchant_name: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// Input for `create_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub merchant_name: String,
}

impl CreateAccountParams {
    pub fn new(
        owner: impl Into<String>,
        balance: i64,
        currency: impl Into<String>,
        merchant_name: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            balance,
            currency: currency.into(),
            merchant_name: merchant_name.into(),
        }
    }

    /// Returns the name of the first required text field that is empty.
    ///
    /// Mirrors the `CHECK (length(..) > 0)` constraints of the `accounts`
    /// table so non-SQL stores reject the same inputs.
    pub fn first_empty_field(&self) -> Option<&'static str> {
        [
            ("owner", self.owner.as_str()),
            ("currency", self.currency.as_str()),
            ("merchant_name", self.merchant_name.as_str()),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

/// Input for `update_account`. Replaces `balance` unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccountParams {
    pub id: AccountId,
    pub balance: i64,
}
