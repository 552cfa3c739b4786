//! Domain model for persisted monetary accounts.
//!
//! # Responsibility
//! - Define the canonical account record returned by every store.
//! - Define the input shapes accepted by store write paths.
//!
//! # Invariants
//! - Every account is identified by a store-assigned `AccountId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod account;
