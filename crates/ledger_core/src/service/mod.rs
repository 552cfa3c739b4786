//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI and embedding layers decoupled from storage details.

pub mod account_service;
