//! Shared fixtures and repository contract checks for integration tests.
#![allow(dead_code)]

use ledger_core::{
    Account, AccountListQuery, AccountRepository, CreateAccountParams, RepoError,
    UpdateAccountParams, NO_ROWS_MESSAGE,
};
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

const CURRENCIES: [&str; 3] = ["USD", "EUR", "CAD"];

pub fn random_owner() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

pub fn random_money() -> i64 {
    rand::thread_rng().gen_range(0..=1000)
}

pub fn random_currency() -> String {
    CURRENCIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("USD")
        .to_string()
}

pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Creates an account from random params and checks the echoed fields.
pub fn create_random_account(repo: &impl AccountRepository) -> Account {
    let params = CreateAccountParams::new(
        random_owner(),
        random_money(),
        random_currency(),
        random_owner(),
    );

    let account = repo.create_account(&params).unwrap();

    assert_eq!(account.owner, params.owner);
    assert_eq!(account.balance, params.balance);
    assert_eq!(account.currency, params.currency);
    assert_eq!(account.merchant_name, params.merchant_name);
    assert_ne!(account.id, 0);
    assert_ne!(account.created_at, 0);
    account
}

pub fn assert_populated(account: &Account) {
    assert_ne!(account.id, 0);
    assert!(!account.owner.is_empty());
    assert!(!account.currency.is_empty());
    assert!(!account.merchant_name.is_empty());
    assert_ne!(account.created_at, 0);
}

pub fn check_create_and_get_roundtrip(repo: &impl AccountRepository) {
    let before = now_epoch_ms();
    let created = repo
        .create_account(&CreateAccountParams::new("alice", 1000, "USD", "shop1"))
        .unwrap();

    let loaded = repo.get_account(created.id).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.owner, "alice");
    assert_eq!(loaded.balance, 1000);
    assert_eq!(loaded.currency, "USD");
    assert_eq!(loaded.merchant_name, "shop1");
    assert!((loaded.created_at - before).abs() <= 1000);
}

pub fn check_update_touches_only_balance(repo: &impl AccountRepository) {
    let original = create_random_account(repo);
    let params = UpdateAccountParams {
        id: original.id,
        balance: random_money() + 5_000,
    };

    let updated = repo.update_account(&params).unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.balance, params.balance);
    assert_eq!(
        Account {
            balance: original.balance,
            ..updated.clone()
        },
        original
    );

    let loaded = repo.get_account(original.id).unwrap();
    assert_eq!(loaded, updated);
}

pub fn check_update_missing_returns_not_found(repo: &impl AccountRepository) {
    let err = repo
        .update_account(&UpdateAccountParams {
            id: 9_999_999,
            balance: 1,
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(9_999_999)));

    let page = repo.list_accounts(&AccountListQuery::new(100, 0)).unwrap();
    assert!(page.iter().all(|account| account.id != 9_999_999));
}

pub fn check_delete_then_get_is_not_found(repo: &impl AccountRepository) {
    let account = create_random_account(repo);

    repo.delete_account(account.id).unwrap();

    let err = repo.get_account(account.id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), NO_ROWS_MESSAGE);

    let again = repo.delete_account(account.id).unwrap_err();
    assert!(matches!(again, RepoError::NotFound(id) if id == account.id));
}

pub fn check_list_window(repo: &impl AccountRepository) {
    for _ in 0..10 {
        create_random_account(repo);
    }

    let accounts = repo.list_accounts(&AccountListQuery::new(5, 5)).unwrap();
    assert_eq!(accounts.len(), 5);
    accounts.iter().for_each(assert_populated);
}

pub fn check_pages_partition_accounts(repo: &impl AccountRepository) {
    let created: HashSet<_> = (0..10)
        .map(|_| create_random_account(repo).id)
        .collect();

    let first = repo.list_accounts(&AccountListQuery::new(5, 0)).unwrap();
    let second = repo.list_accounts(&AccountListQuery::new(5, 5)).unwrap();

    let ids: Vec<_> = first.iter().chain(second.iter()).map(|a| a.id).collect();
    assert_eq!(ids.len(), 10);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(ids.into_iter().collect::<HashSet<_>>(), created);
}

pub fn check_list_past_end_is_empty(repo: &impl AccountRepository) {
    create_random_account(repo);
    let page = repo.list_accounts(&AccountListQuery::new(5, 50)).unwrap();
    assert!(page.is_empty());
}

pub fn check_list_rejects_invalid_window(repo: &impl AccountRepository) {
    for (limit, offset) in [(0, 0), (-1, 0), (5, -1)] {
        let err = repo
            .list_accounts(&AccountListQuery::new(limit, offset))
            .unwrap_err();
        assert!(
            matches!(err, RepoError::InvalidArgument(_)),
            "limit={limit} offset={offset}: {err}"
        );
    }
}

pub fn check_empty_text_fields_are_constraint_violations(repo: &impl AccountRepository) {
    for params in [
        CreateAccountParams::new("", 1, "USD", "shop1"),
        CreateAccountParams::new("alice", 1, "", "shop1"),
        CreateAccountParams::new("alice", 1, "USD", ""),
    ] {
        let err = repo.create_account(&params).unwrap_err();
        assert!(
            matches!(err, RepoError::ConstraintViolation(_)),
            "{params:?}: {err}"
        );
    }

    let page = repo.list_accounts(&AccountListQuery::new(10, 0)).unwrap();
    assert!(page.is_empty());
}

pub fn check_negative_balance_is_accepted(repo: &impl AccountRepository) {
    let account = repo
        .create_account(&CreateAccountParams::new("bob", -250, "EUR", "shop2"))
        .unwrap();
    assert_eq!(repo.get_account(account.id).unwrap().balance, -250);
}

pub fn check_ids_and_created_at_are_monotonic(repo: &impl AccountRepository) {
    let accounts: Vec<_> = (0..5).map(|_| create_random_account(repo)).collect();
    for pair in accounts.windows(2) {
        assert!(pair[0].id < pair[1].id);
        assert!(pair[0].created_at <= pair[1].created_at);
    }

    let last = accounts.last().unwrap();
    repo.delete_account(last.id).unwrap();
    let next = create_random_account(repo);
    assert!(next.id > last.id);
    assert!(next.created_at >= last.created_at);
}
