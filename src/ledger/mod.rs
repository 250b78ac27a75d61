//! Ledger module
//!
//! The ledger engine: validation, id assignment, running balance and the
//! serialization discipline for concurrent writers.

mod engine;
mod error;
mod pages;

pub use engine::{LedgerEngine, LedgerHead};
pub use error::LedgerError;
pub use pages::LedgerPages;
