//! Monetary amounts on catalog records.
//!
//! Prices are stored with a total precision of 16 digits, of which `PriceDigits`
//! are decimals (4 unless configured otherwise).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use oneclick_core::{DomainError, DomainResult, ValueObject};

/// Total number of significant digits a price may carry.
pub const PRICE_PRECISION: u32 = 16;

/// Default number of decimals for prices.
pub const DEFAULT_PRICE_DIGITS: u32 = 4;

/// Number of decimals allowed on prices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceDigits(u32);

impl PriceDigits {
    pub fn new(digits: u32) -> DomainResult<Self> {
        if digits > PRICE_PRECISION {
            return Err(DomainError::validation(format!(
                "price digits must be at most {PRICE_PRECISION} (got {digits})"
            )));
        }
        Ok(Self(digits))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Check that `value` fits `(PRICE_PRECISION, digits)`.
    pub fn check(self, field: &str, value: Decimal) -> DomainResult<()> {
        if value.normalize().scale() > self.0 {
            return Err(DomainError::validation(format!(
                "{field} has more than {} decimals",
                self.0
            )));
        }

        let mut limit = Decimal::ONE;
        for _ in 0..(PRICE_PRECISION - self.0) {
            limit *= Decimal::TEN;
        }
        if value.abs().trunc() >= limit {
            return Err(DomainError::validation(format!(
                "{field} exceeds {} integer digits",
                PRICE_PRECISION - self.0
            )));
        }
        Ok(())
    }
}

impl Default for PriceDigits {
    fn default() -> Self {
        Self(DEFAULT_PRICE_DIGITS)
    }
}

/// A non-negative price.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self(amount))
    }

    /// Missing prices default to zero.
    pub fn or_zero(amount: Option<Decimal>) -> DomainResult<Self> {
        amount.map(Self::new).transpose().map(|p| p.unwrap_or(Self::ZERO))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_reject_too_many_decimals() {
        let digits = PriceDigits::default();
        assert!(digits.check("list_price", Decimal::new(12345, 4)).is_ok());
        // Trailing zeros do not count.
        assert!(digits.check("list_price", Decimal::new(1_000_000, 6)).is_ok());
        assert!(matches!(
            digits.check("list_price", Decimal::new(123456, 5)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn digits_reject_too_many_integer_digits() {
        let digits = PriceDigits::new(4).unwrap();
        assert!(digits.check("cost_price", Decimal::new(999_999_999_999, 0)).is_ok());
        assert!(digits.check("cost_price", Decimal::new(1_000_000_000_000, 0)).is_err());
    }

    #[test]
    fn digits_above_precision_are_rejected() {
        assert!(PriceDigits::new(16).is_ok());
        assert!(PriceDigits::new(17).is_err());
    }

    #[test]
    fn price_defaults_to_zero_and_rejects_negative() {
        assert_eq!(Price::or_zero(None).unwrap(), Price::ZERO);
        assert_eq!(
            Price::or_zero(Some(Decimal::new(1050, 2))).unwrap().amount(),
            Decimal::new(1050, 2)
        );
        assert!(Price::new(Decimal::new(-1, 0)).is_err());
    }
}
