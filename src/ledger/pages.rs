//! Paged reads
//!
//! A lazily produced, restartable walk over the ledger. Each page is
//! reconciled against the last row of the page before it, so the chain is
//! verified end to end without holding the whole ledger in memory. Because the
//! ledger is append-only, a prefix once read never changes; resuming from a
//! cursor sees exactly what a single full scan would have.

use crate::domain::{Balance, Transaction};

use super::{LedgerEngine, LedgerError};

#[derive(Debug, Clone, Copy)]
enum Position {
    /// Resume after this id; its balance is not known yet
    After(i64),
    /// Last row handed out (or the opening position)
    At(i64, Balance),
}

/// Page iterator returned by `LedgerEngine::pages`
pub struct LedgerPages<'a> {
    engine: &'a LedgerEngine,
    page_size: i64,
    position: Position,
    exhausted: bool,
}

impl<'a> LedgerPages<'a> {
    pub(crate) fn new(engine: &'a LedgerEngine, after_id: Option<i64>, page_size: i64) -> Self {
        let (start_id, opening) = engine.opening();
        let position = match after_id {
            Some(id) if id > start_id => Position::After(id),
            _ => Position::At(start_id, opening),
        };

        Self {
            engine,
            page_size: page_size.max(1),
            position,
            exhausted: false,
        }
    }

    /// Id of the last row handed out; pass it to `pages_after` to resume.
    pub fn cursor(&self) -> i64 {
        match self.position {
            Position::After(id) | Position::At(id, _) => id,
        }
    }

    /// Next page, or `None` once the end of the ledger was reached.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Transaction>>, LedgerError> {
        if self.exhausted {
            return Ok(None);
        }

        let previous = self.resolve().await?;
        let rows = self
            .engine
            .store()
            .scan_after(previous.0, self.page_size)
            .await?;

        if rows.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        let (last_id, last_balance) = self.engine.reconcile(previous, &rows)?;
        self.position = Position::At(last_id, last_balance);
        if (rows.len() as i64) < self.page_size {
            self.exhausted = true;
        }

        Ok(Some(rows))
    }

    /// Drain the remaining pages into one vector.
    pub async fn collect_remaining(mut self) -> Result<Vec<Transaction>, LedgerError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        Ok(all)
    }

    async fn resolve(&mut self) -> Result<(i64, Balance), LedgerError> {
        match self.position {
            Position::At(id, balance) => Ok((id, balance)),
            Position::After(id) => {
                let row = self
                    .engine
                    .get(id)
                    .await?
                    .ok_or(LedgerError::UnknownCursor(id))?;
                let resolved = (row.id, row.balance());
                self.position = Position::At(resolved.0, resolved.1);
                Ok(resolved)
            }
        }
    }
}
