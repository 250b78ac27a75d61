//! Ledger Engine
//!
//! Owns id assignment and the running balance.
//!
//! Appends are linearized by a single async mutex around the ledger tail (the
//! last committed id and its balance). The store write happens inside the
//! critical section, so no two appends ever compute from the same predecessor
//! within one engine. Across engines sharing a store, the store's id
//! uniqueness turns a lost race into `StorageError::Conflict`; the engine then
//! re-reads the tail and retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{Balance, CandidateEntry, Transaction, ValidatedEntry};
use crate::store::LedgerStore;

use super::{LedgerError, LedgerPages};

/// Attempts per append before giving up on a contended tail
const MAX_ATTEMPTS: u32 = 3;

/// Last committed position of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerHead {
    /// Id of the last committed row, 0 for an empty ledger
    pub last_id: i64,
    /// Balance after the last committed row, or the opening balance
    pub balance: Balance,
}

/// Concurrent-safe, append-only running-balance ledger
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    opening_balance: Balance,
    /// Cached tail. `None` means "re-read from the store before use".
    tail: Mutex<Option<LedgerHead>>,
}

impl LedgerEngine {
    /// Create an engine over `store` with a zero opening balance
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            opening_balance: Balance::zero(),
            tail: Mutex::new(None),
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: Balance) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    pub fn opening_balance(&self) -> Balance {
        self.opening_balance
    }

    pub(crate) fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// Validate `candidate` and append it to the ledger.
    pub async fn append(&self, candidate: CandidateEntry) -> Result<Transaction, LedgerError> {
        let entry = candidate.validate()?;
        self.append_validated(entry).await
    }

    /// Append an already validated entry.
    ///
    /// Either the full row (id, balance, fields) is committed and returned, or
    /// nothing is written and the tail is left for the next append to re-read.
    pub async fn append_validated(&self, entry: ValidatedEntry) -> Result<Transaction, LedgerError> {
        let mut tail = self.tail.lock().await;

        for attempt in 1..=MAX_ATTEMPTS {
            let head = match *tail {
                Some(head) => head,
                None => self.read_head().await?,
            };

            let next_id = head.last_id + 1;
            let balance = entry.movement.apply(head.balance)?;
            let record = Transaction::from_entry(next_id, entry.clone(), balance);

            match self.store.append_row(record).await {
                Ok(committed) => {
                    *tail = Some(LedgerHead {
                        last_id: committed.id,
                        balance,
                    });

                    tracing::info!(
                        id = committed.id,
                        balance = %balance,
                        store = self.store.name(),
                        "Transaction appended"
                    );

                    return Ok(committed);
                }
                Err(e) if e.is_conflict() => {
                    // Someone else committed this id; our cached tail is stale
                    *tail = None;

                    if attempt < MAX_ATTEMPTS {
                        tracing::warn!(
                            id = next_id,
                            "Append conflict, retrying (attempt {}/{})",
                            attempt,
                            MAX_ATTEMPTS
                        );
                        tokio::time::sleep(Duration::from_millis(50 * attempt as u64)).await;
                    }
                }
                Err(e) => {
                    // The outcome of a failed write is unknown to us; re-read next time
                    *tail = None;

                    tracing::error!(
                        id = next_id,
                        store = self.store.name(),
                        error = %e,
                        "Append failed"
                    );

                    return Err(e.into());
                }
            }
        }

        tracing::error!("Giving up append after {} conflicts", MAX_ATTEMPTS);
        Err(LedgerError::Contention {
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Every transaction in ascending id order, reconciled from the opening balance.
    pub async fn list_all(&self) -> Result<Vec<Transaction>, LedgerError> {
        let rows = self.store.scan_all().await?;
        self.reconcile(self.opening(), &rows)?;
        Ok(rows)
    }

    /// Lazily page through the whole ledger.
    pub fn pages(&self, page_size: i64) -> LedgerPages<'_> {
        LedgerPages::new(self, None, page_size)
    }

    /// Lazily page through the ledger starting after transaction `after_id`.
    pub fn pages_after(&self, after_id: i64, page_size: i64) -> LedgerPages<'_> {
        LedgerPages::new(self, Some(after_id), page_size)
    }

    /// A single page of at most `limit` rows following `after_id`.
    pub async fn list_page(
        &self,
        after_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut pages = LedgerPages::new(self, after_id, limit);
        Ok(pages.next_page().await?.unwrap_or_default())
    }

    /// A single transaction by id
    pub async fn get(&self, id: i64) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.store.read_one(id).await?)
    }

    /// Current committed head, read from the store
    pub async fn head(&self) -> Result<LedgerHead, LedgerError> {
        self.read_head().await
    }

    async fn read_head(&self) -> Result<LedgerHead, LedgerError> {
        let head = match self.store.read_last().await? {
            Some(last) => LedgerHead {
                last_id: last.id,
                balance: last.balance(),
            },
            None => LedgerHead {
                last_id: 0,
                balance: self.opening_balance,
            },
        };
        Ok(head)
    }

    pub(crate) fn opening(&self) -> (i64, Balance) {
        (0, self.opening_balance)
    }

    /// Check that `rows` form an unbroken chain after `previous`.
    /// Returns the position of the last row.
    pub(crate) fn reconcile(
        &self,
        previous: (i64, Balance),
        rows: &[Transaction],
    ) -> Result<(i64, Balance), LedgerError> {
        let mut previous = previous;
        for row in rows {
            if let Err(discrepancy) = row.follows(previous) {
                tracing::error!(
                    store = self.store.name(),
                    %discrepancy,
                    "Ledger consistency violation"
                );
                return Err(LedgerError::ConsistencyViolation(discrepancy));
            }
            previous = (row.id, row.balance());
        }
        Ok(previous)
    }
}
