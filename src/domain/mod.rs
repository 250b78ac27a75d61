//! Domain module
//!
//! Core domain types and validation rules of the ledger.

pub mod amount;
pub mod entry;
pub mod error;
pub mod transaction;

pub use amount::{Amount, AmountError, Balance};
pub use entry::{CandidateEntry, Movement, ValidatedEntry, DATE_FORMAT, MAX_DESCRIPTION_LEN};
pub use error::ValidationError;
pub use transaction::{Discrepancy, Transaction};
