//! In-memory ledger store
//!
//! Non-durable backend with the same id contract as the database store.
//! Rows live in a `Vec` kept in id order behind a read/write lock, so a scan
//! is a consistent snapshot and an append is all-or-nothing.

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

use crate::domain::Transaction;

use super::{LedgerStore, StorageError};

#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    rows: RwLock<Vec<Transaction>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload existing rows (e.g. restored from an export).
    ///
    /// Rows are taken as-is; the engine reconciles them on read.
    pub fn with_rows(mut rows: Vec<Transaction>) -> Self {
        rows.sort_by_key(|row| row.id);
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Number of committed rows.
    ///
    /// A writer that panicked cannot leave a half-pushed row behind, so a
    /// poisoned lock still guards a valid prefix and is read through.
    pub fn len(&self) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_rows(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Transaction>>, StorageError> {
        self.rows
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn append_row(&self, record: Transaction) -> Result<Transaction, StorageError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))?;

        let last_id = rows.last().map(|row| row.id).unwrap_or(0);
        if record.id <= last_id {
            return Err(StorageError::Conflict { id: record.id });
        }
        if record.id != last_id + 1 {
            return Err(StorageError::Rejected(format!(
                "id {} does not follow last committed id {}",
                record.id, last_id
            )));
        }

        rows.push(record.clone());
        Ok(record)
    }

    async fn scan_all(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(self.read_rows()?.clone())
    }

    async fn scan_after(&self, after_id: i64, limit: i64) -> Result<Vec<Transaction>, StorageError> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let rows = self.read_rows()?;
        let start = rows.partition_point(|row| row.id <= after_id);
        Ok(rows[start..].iter().take(limit).cloned().collect())
    }

    async fn read_last(&self) -> Result<Option<Transaction>, StorageError> {
        Ok(self.read_rows()?.last().cloned())
    }

    async fn read_one(&self, id: i64) -> Result<Option<Transaction>, StorageError> {
        let rows = self.read_rows()?;
        Ok(rows
            .binary_search_by_key(&id, |row| row.id)
            .ok()
            .map(|index| rows[index].clone()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
