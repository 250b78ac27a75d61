//! Amount type
//!
//! Domain primitives for monetary values.
//! Amounts are validated at construction time, so an invalid debit or credit
//! cannot reach the ledger engine.

use rust_decimal::Decimal;
use std::fmt;

/// Maximum allowed single amount (1 trillion)
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum decimal places (8)
const MAX_SCALE: u32 = 8;

/// Balances must stay below 10^20 to fit a NUMERIC(28, 8) column
const BALANCE_LIMIT: i128 = 100_000_000_000_000_000_000;

/// Amount represents a validated, non-negative monetary value.
///
/// # Invariants
/// - Value is never negative (zero is allowed)
/// - Maximum 8 decimal places
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use saldo_ledger::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(100, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(100, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max 8, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value (1 trillion)")]
    Overflow,
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::Negative` if value < 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }

        // Trailing zeros ("10.000000000") do not count against the scale limit
        let value = value.normalize();
        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        if value > Decimal::from(MAX_AMOUNT) {
            return Err(AmountError::Overflow);
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Balance is the running total of the ledger.
/// Unlike Amount, Balance can be negative (credits may exceed debits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Balance(Decimal);

impl Balance {
    pub fn new(value: Decimal) -> Self {
        Self(value.normalize())
    }

    /// A balance the store can hold exactly: at most 8 decimal places and
    /// a magnitude below 10^20. `None` otherwise.
    pub fn storable(value: Decimal) -> Option<Self> {
        let value = value.normalize();
        let limit = Decimal::from_i128_with_scale(BALANCE_LIMIT, 0);
        if value.scale() > MAX_SCALE || value.abs() >= limit {
            return None;
        }
        Some(Self(value))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Add a debit to the balance. `None` if the result is not storable.
    pub fn debit(&self, amount: &Amount) -> Option<Balance> {
        self.0.checked_add(amount.value()).and_then(Balance::storable)
    }

    /// Subtract a credit from the balance. `None` if the result is not storable.
    pub fn credit(&self, amount: &Amount) -> Option<Balance> {
        self.0.checked_sub(amount.value()).and_then(Balance::storable)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Balance {
    fn from(value: Decimal) -> Self {
        Balance::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amount(value: i64) -> Amount {
        Amount::new(Decimal::from(value)).unwrap()
    }

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(Decimal::new(100, 0));
        assert!(amount.is_ok());
        assert_eq!(amount.unwrap().value(), Decimal::new(100, 0));
    }

    #[test]
    fn test_amount_zero_allowed() {
        let amount = Amount::new(Decimal::ZERO).unwrap();
        assert!(amount.value().is_zero());
    }

    #[test]
    fn test_amount_negative_rejected() {
        let amount = Amount::new(Decimal::new(-100, 0));
        assert!(matches!(amount, Err(AmountError::Negative(_))));
    }

    #[test]
    fn test_amount_too_many_decimals() {
        // 0.123456789 has 9 decimal places
        let amount = Amount::new(Decimal::new(123456789, 9));
        assert!(matches!(amount, Err(AmountError::TooManyDecimals(9))));
    }

    #[test]
    fn test_amount_trailing_zeros_not_counted() {
        // 1.000000000 normalizes to 1
        let amount = Amount::new(Decimal::new(1_000_000_000, 9)).unwrap();
        assert_eq!(amount.value(), Decimal::ONE);
    }

    #[test]
    fn test_amount_overflow() {
        let value = Decimal::from_str("1000000000001").unwrap();
        assert!(matches!(Amount::new(value), Err(AmountError::Overflow)));
    }

    #[test]
    fn test_amount_max_value_ok() {
        let value = Decimal::from_str("1000000000000").unwrap();
        assert!(Amount::new(value).is_ok());
    }

    #[test]
    fn test_balance_debit_credit() {
        let balance = Balance::zero();

        let balance = balance.debit(&amount(100)).unwrap();
        assert_eq!(balance.value(), Decimal::new(100, 0));

        let balance = balance.credit(&amount(130)).unwrap();
        assert_eq!(balance.value(), Decimal::new(-30, 0));
    }

    #[test]
    fn test_balance_overflow_is_none() {
        let balance = Balance::new(Decimal::MAX);
        assert!(balance.debit(&amount(1)).is_none());
    }

    #[test]
    fn test_balance_beyond_column_range_is_none() {
        let near_limit = Balance::new(Decimal::from_str("99999999999999999999").unwrap());
        assert!(near_limit.debit(&amount(1)).is_none());
        assert!(near_limit.credit(&amount(1)).is_some());
    }

    #[test]
    fn test_balance_storable() {
        assert_eq!(
            Balance::storable(Decimal::new(12345678, 8)).map(|b| b.value()),
            Some(Decimal::new(12345678, 8))
        );
        // trailing zeros are not significant
        assert!(Balance::storable(Decimal::new(1_000_000_000, 9)).is_some());
        assert!(Balance::storable(Decimal::new(123456789, 9)).is_none());
        assert!(Balance::storable(Decimal::from_str("-100000000000000000000").unwrap()).is_none());
    }
}
