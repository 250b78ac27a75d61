//! saldo-ledger Library
//!
//! Append-only running-balance ledger: domain types, the concurrent-safe
//! ledger engine, store backends and the HTTP surface.

pub mod api;
pub mod domain;
pub mod ledger;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::AppError;
pub use domain::{Amount, Balance, CandidateEntry, Transaction, ValidationError};
pub use ledger::{LedgerEngine, LedgerError, LedgerHead};
pub use store::{LedgerStore, MemoryLedgerStore, PgLedgerStore, StorageError};
