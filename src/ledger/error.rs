//! Ledger Engine Errors

use crate::domain::{Discrepancy, ValidationError};
use crate::store::StorageError;

/// Errors returned by `LedgerEngine` operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Candidate entry rejected; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Store failed; nothing was written
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Committed rows do not reconcile. Indicates a serialization bug or
    /// out-of-band tampering with the store.
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(Discrepancy),

    /// Other writers kept taking the next id
    #[error("Append contention: gave up after {attempts} conflicting attempts")]
    Contention { attempts: u32 },

    /// Paging resumed from an id that is not in the ledger
    #[error("Unknown cursor: no transaction with id {0}")]
    UnknownCursor(i64),
}
