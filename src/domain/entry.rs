//! Candidate entries
//!
//! The explicit input structure for an append. A `CandidateEntry` carries the
//! raw caller values; `validate` turns it into a `ValidatedEntry` or rejects it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, Balance, ValidationError};

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Wire format of `Transaction::date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unvalidated entry as supplied by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub debit: Option<Decimal>,
    #[serde(default)]
    pub credit: Option<Decimal>,
}

impl CandidateEntry {
    pub fn debit(date: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            debit: Some(amount),
            credit: None,
        }
    }

    pub fn credit(date: impl Into<String>, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            debit: None,
            credit: Some(amount),
        }
    }

    /// Check every field and produce an entry the engine can apply.
    pub fn validate(self) -> Result<ValidatedEntry, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::BlankDescription);
        }
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong {
                length,
                max: MAX_DESCRIPTION_LEN,
            });
        }

        let date = parse_date(&self.date)?;

        let movement = match (self.debit, self.credit) {
            (Some(_), Some(_)) => return Err(ValidationError::BothDebitAndCredit),
            (None, None) => return Err(ValidationError::MissingAmount),
            (Some(debit), None) => Movement::Debit(Amount::new(debit)?),
            (None, Some(credit)) => Movement::Credit(Amount::new(credit)?),
        };

        Ok(ValidatedEntry {
            date,
            description: description.to_string(),
            movement,
        })
    }
}

/// Strict `YYYY-MM-DD` parsing: zero-padded, real calendar dates only.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(ValidationError::InvalidDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Direction and size of a single ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Increases the running balance
    Debit(Amount),
    /// Decreases the running balance
    Credit(Amount),
}

impl Movement {
    /// Balance after applying this movement to `previous`.
    pub fn apply(&self, previous: Balance) -> Result<Balance, ValidationError> {
        match self {
            Movement::Debit(amount) => previous.debit(amount),
            Movement::Credit(amount) => previous.credit(amount),
        }
        .ok_or(ValidationError::BalanceOverflow)
    }

    pub fn debit(&self) -> Option<Decimal> {
        match self {
            Movement::Debit(amount) => Some(amount.value()),
            Movement::Credit(_) => None,
        }
    }

    pub fn credit(&self) -> Option<Decimal> {
        match self {
            Movement::Credit(amount) => Some(amount.value()),
            Movement::Debit(_) => None,
        }
    }
}

/// Entry that passed validation; only the engine turns it into a `Transaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub date: NaiveDate,
    pub description: String,
    pub movement: Movement,
}
