use crate::error::LedgerError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Number of decimal places of the currency's minor unit.
pub const MINOR_UNIT_DP: u32 = 2;

/// A monetary value in the ledger's single currency.
///
/// Wraps `rust_decimal::Decimal` so balances never pass through floating point.
/// Values may be zero; negative values only appear as intermediate results and
/// are clamped by [`Money::saturating_sub`] wherever a balance is derived.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

/// A strictly positive amount, as carried by a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Rounds half-up to the currency's minor unit.
    pub fn round_to_minor_unit(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `self + rhs`, capped at the largest representable value.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// `max(0, self - rhs)`
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if self > rhs { self - rhs } else { Self::ZERO }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Money::from(*self), f)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.0));
        let b = Money::new(dec!(4.5));
        assert_eq!(a + b, Money::new(dec!(14.5)));
        assert_eq!(a - b, Money::new(dec!(5.5)));
        assert_eq!(b.saturating_sub(a), Money::ZERO);
        assert_eq!(a.saturating_sub(b), Money::new(dec!(5.5)));
    }

    #[test]
    fn test_saturating_add_caps_at_max() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.saturating_add(Money::new(dec!(1))), max);
        assert_eq!(
            Money::new(dec!(1.25)).saturating_add(Money::new(dec!(2))),
            Money::new(dec!(3.25))
        );
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(0.01)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0)),
            Err(LedgerError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-5)),
            Err(LedgerError::ValidationError(_))
        ));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(
            Money::new(dec!(16.665)).round_to_minor_unit(),
            Money::new(dec!(16.67))
        );
        assert_eq!(
            Money::new(dec!(16.664)).round_to_minor_unit(),
            Money::new(dec!(16.66))
        );
        assert_eq!(
            Money::new(dec!(0.005)).round_to_minor_unit(),
            Money::new(dec!(0.01))
        );
    }

    #[test]
    fn test_display_uses_minor_unit() {
        assert_eq!(Money::new(dec!(1000)).to_string(), "1000.00");
        assert_eq!(Money::new(dec!(42.5)).to_string(), "42.50");
    }

    #[test]
    fn test_amount_rejects_non_positive_on_deserialize() {
        assert!(serde_json::from_str::<Amount>("\"12.50\"").is_ok());
        assert!(serde_json::from_str::<Amount>("\"0\"").is_err());
    }
}
