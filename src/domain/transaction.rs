//! Transaction
//!
//! A committed ledger row. Immutable once the store has accepted it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, Balance, Movement, ValidatedEntry};

/// One row of the ledger with its running balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub debit: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub credit: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub balance: Decimal,
}

impl Transaction {
    /// Materialize a validated entry at position `id` with its computed balance.
    pub fn from_entry(id: i64, entry: ValidatedEntry, balance: Balance) -> Self {
        Self {
            id,
            date: entry.date,
            description: entry.description,
            debit: entry.movement.debit(),
            credit: entry.movement.credit(),
            balance: balance.value(),
        }
    }

    /// Recover the movement of a stored row.
    ///
    /// `None` when the row breaks the exactly-one-of debit/credit rule or
    /// carries an amount that could never have been validated.
    pub fn movement(&self) -> Option<Movement> {
        match (self.debit, self.credit) {
            (Some(debit), None) => Amount::new(debit).ok().map(Movement::Debit),
            (None, Some(credit)) => Amount::new(credit).ok().map(Movement::Credit),
            _ => None,
        }
    }

    pub fn balance(&self) -> Balance {
        Balance::new(self.balance)
    }

    /// Check that this row follows `previous` (id and balance).
    ///
    /// `previous` is `(id, balance)` of the predecessor, or `(0, opening)` for
    /// the first row.
    pub fn follows(&self, previous: (i64, Balance)) -> Result<(), Discrepancy> {
        let (previous_id, previous_balance) = previous;
        if self.id != previous_id + 1 {
            return Err(Discrepancy::Id {
                expected: previous_id + 1,
                found: self.id,
            });
        }

        let movement = self.movement().ok_or(Discrepancy::Movement { id: self.id })?;
        let expected = movement
            .apply(previous_balance)
            .map_err(|_| Discrepancy::Movement { id: self.id })?;
        if expected != self.balance() {
            return Err(Discrepancy::Balance {
                id: self.id,
                expected: expected.value(),
                found: self.balance,
            });
        }

        Ok(())
    }
}

/// How a stored row fails to reconcile with its predecessor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Discrepancy {
    #[error("expected id {expected}, found {found}")]
    Id { expected: i64, found: i64 },

    #[error("row {id} does not carry exactly one valid debit or credit")]
    Movement { id: i64 },

    #[error("row {id} has balance {found}, expected {expected}")]
    Balance {
        id: i64,
        expected: Decimal,
        found: Decimal,
    },
}
