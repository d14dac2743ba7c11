//! Amount - Non-negative decimal wrapper for cash balances
//!
//! Virtual cash in FanTrade can never go negative.
//! This is enforced at the type level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Amount overflow")]
    Overflow,
}

/// A non-negative cash amount in game currency units.
///
/// # Invariant
/// The inner value is always >= 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use fantrade_core::Amount;
/// use rust_decimal::Decimal;
///
/// let cash = Amount::new(Decimal::new(10_000, 0)).unwrap();
/// assert_eq!(cash.value(), Decimal::new(10_000, 0));
///
/// // Negative amounts are rejected
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            Err(AmountError::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Notional value of `quantity` shares at `price` (`quantity × price`).
    pub fn notional(quantity: u64, price: Decimal) -> Result<Self, AmountError> {
        let value = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or(AmountError::Overflow)?;
        Self::new(value)
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_negative_rejected() {
        let result = Amount::new(dec!(-0.01));
        assert!(matches!(result, Err(AmountError::NegativeAmount(_))));
    }

    #[test]
    fn test_notional() {
        let cost = Amount::notional(10, dec!(12.5)).unwrap();
        assert_eq!(cost.value(), dec!(125));
    }

    #[test]
    fn test_notional_rejects_negative_price() {
        assert!(Amount::notional(3, dec!(-1)).is_err());
    }

    #[test]
    fn test_checked_sub_prevents_negative() {
        let cash = Amount::new(dec!(50)).unwrap();
        let cost = Amount::new(dec!(100)).unwrap();
        assert!(cash.checked_sub(&cost).is_none());
    }

    #[test]
    fn test_checked_sub_to_zero() {
        let cash = Amount::new(dec!(100)).unwrap();
        let cost = Amount::new(dec!(100)).unwrap();
        assert!(cash.checked_sub(&cost).unwrap().is_zero());
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let parsed: Result<Amount, _> = serde_json::from_str("\"-5\"");
        assert!(parsed.is_err());
    }
}
