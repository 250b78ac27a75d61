//! Ledger Store module
//!
//! Durable, ordered, append-only storage of ledger rows.
//! The engine owns ids and balances; a store only persists what it is handed
//! and never rewrites an accepted row.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;

use crate::domain::Transaction;

pub use error::StorageError;
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Storage contract required by the ledger engine
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Durably write a single row.
    ///
    /// Atomic: the row is either fully committed or absent. Fails with
    /// `StorageError::Conflict` when `record.id` is already taken.
    async fn append_row(&self, record: Transaction) -> Result<Transaction, StorageError>;

    /// All committed rows in ascending id order, from one consistent read.
    async fn scan_all(&self) -> Result<Vec<Transaction>, StorageError>;

    /// Up to `limit` committed rows with id greater than `after_id`, ascending.
    async fn scan_after(&self, after_id: i64, limit: i64) -> Result<Vec<Transaction>, StorageError>;

    /// The row with the highest id, if any.
    async fn read_last(&self) -> Result<Option<Transaction>, StorageError>;

    /// A single committed row.
    async fn read_one(&self, id: i64) -> Result<Option<Transaction>, StorageError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
