//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::AmountError;

/// Reasons a candidate entry is rejected before it ever reaches storage.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Description is empty or whitespace only
    #[error("Description must not be blank")]
    BlankDescription,

    /// Description exceeds the column width
    #[error("Description is too long: {length} characters (max {max})")]
    DescriptionTooLong { length: usize, max: usize },

    /// Date is not a real calendar date in YYYY-MM-DD form
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Both debit and credit were supplied
    #[error("An entry is either a debit or a credit, not both")]
    BothDebitAndCredit,

    /// Neither debit nor credit was supplied
    #[error("An entry needs exactly one of debit or credit")]
    MissingAmount,

    /// Negative debit or credit
    #[error("Amount must not be negative: {0}")]
    NegativeAmount(String),

    /// Unparseable, too precise or too large amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Applying the entry would overflow the running balance
    #[error("Balance overflow")]
    BalanceOverflow,
}

impl ValidationError {
    /// Stable reason code surfaced to API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankDescription => "blank_description",
            Self::DescriptionTooLong { .. } => "description_too_long",
            Self::InvalidDate(_) => "invalid_date",
            Self::BothDebitAndCredit => "both_debit_and_credit",
            Self::MissingAmount => "missing_amount",
            Self::NegativeAmount(_) => "negative_amount",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::BalanceOverflow => "balance_overflow",
        }
    }
}

impl From<AmountError> for ValidationError {
    fn from(err: AmountError) -> Self {
        match err {
            AmountError::Negative(value) => Self::NegativeAmount(value.to_string()),
            other => Self::InvalidAmount(other.to_string()),
        }
    }
}
