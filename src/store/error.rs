//! Ledger Store Errors
//!
//! Error types for store operations.

/// Errors that can occur in a ledger store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The id is already taken by a committed row
    #[error("Append conflict: id {id} is already committed")]
    Conflict { id: i64 },

    /// Store is unreachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store refused the write
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// A stored row could not be decoded
    #[error("Corrupt row {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Check if this error is an append conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }

    /// Check if the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        match self {
            StorageError::Unavailable(_) => true,
            StorageError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Tls(_)
            ),
            _ => false,
        }
    }
}
