//! Discounts
//!
//! Turns a promotion's [`Discount`] rule into an amount in minor units for a
//! given subtotal and shipping fee.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

use crate::promotions::Discount;

/// Errors specific to discount calculations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Percentage outside `0..=100`.
    #[error("percentage {0} is outside 0..=100")]
    PercentOutOfRange(u8),
}

/// Convert a whole percent (`10` for 10%) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`DiscountError::PercentOutOfRange`] for values above 100.
pub fn whole_percent(percent: u8) -> Result<Percentage, DiscountError> {
    if percent > 100 {
        return Err(DiscountError::PercentOutOfRange(percent));
    }

    Ok(Percentage::from(
        Decimal::from(percent) / Decimal::ONE_HUNDRED,
    ))
}

/// Calculate `percent` of a minor unit amount.
///
/// Fractions of the smallest currency unit are rounded up, so the discounted
/// total is the floor of the exact value.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: u64) -> Result<u64, DiscountError> {
    let minor = Decimal::from_u64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::AwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}

/// Discount amount in minor units for `discount` against `subtotal`.
///
/// Fixed amounts are returned as-is, even when they exceed the subtotal.
/// Free shipping yields its configured offset regardless of the fee.
///
/// # Errors
///
/// Returns a [`DiscountError`] when a percentage is invalid or overflows.
pub fn discount_amount(discount: &Discount, subtotal: u64) -> Result<u64, DiscountError> {
    match *discount {
        Discount::PercentageOff { percentage } => {
            percent_of_minor(&whole_percent(percentage)?, subtotal)
        }
        Discount::FixedAmountOff { amount } | Discount::FreeShipping { amount } => Ok(amount),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn ten_percent_of_four_hundred_thousand() -> TestResult {
        let amount = discount_amount(&Discount::PercentageOff { percentage: 10 }, 400_000)?;

        assert_eq!(amount, 40_000);

        Ok(())
    }

    #[test]
    fn fractional_percent_rounds_up() -> TestResult {
        // 15% of 333 = 49.95
        let amount = percent_of_minor(&whole_percent(15)?, 333)?;

        assert_eq!(amount, 50);

        Ok(())
    }

    #[test]
    fn fixed_amount_is_not_clamped() -> TestResult {
        let amount = discount_amount(&Discount::FixedAmountOff { amount: 900 }, 100)?;

        assert_eq!(amount, 900);

        Ok(())
    }

    #[test]
    fn percent_above_hundred_is_rejected() {
        assert_eq!(
            discount_amount(&Discount::PercentageOff { percentage: 101 }, 100),
            Err(DiscountError::PercentOutOfRange(101))
        );
    }

    #[test]
    fn hundred_percent_of_max_does_not_panic() {
        let result = discount_amount(&Discount::PercentageOff { percentage: 100 }, u64::MAX);

        assert!(result.is_ok(), "u64::MAX fits in a Decimal");
    }
}
