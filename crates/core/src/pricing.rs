//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, discount_amount},
    items::LineItem,
    promotions::Promotion,
    selection::SelectionSet,
};

/// Largest minor unit amount representable as [`Money`].
const MONEY_LIMIT: u64 = i64::MAX.unsigned_abs();

/// Errors that can occur while pricing a cart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    /// An amount did not fit in the money representation.
    #[error("amount overflowed while pricing the order")]
    Overflow,

    /// Errors bubbled up from the discount calculation.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Subtotal, discount, shipping and total for a set of line items.
///
/// Every amount is guaranteed to fit in an `i64` of minor units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    subtotal: u64,
    discount: u64,
    shipping_fee: u64,
    free_shipping: bool,
    total: u64,
    currency: &'static Currency,
}

impl Totals {
    /// Sum of unit price times quantity over the priced items.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.money(self.subtotal)
    }

    /// Promotion discount.
    pub fn discount(&self) -> Money<'static, Currency> {
        self.money(self.discount)
    }

    /// Shipping as displayed to the shopper: zero under a free-shipping promotion.
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.money(self.shipping_minor())
    }

    /// The configured shipping fee, regardless of promotion.
    pub fn shipping_fee(&self) -> Money<'static, Currency> {
        self.money(self.shipping_fee)
    }

    /// Amount payable, never negative.
    pub fn total(&self) -> Money<'static, Currency> {
        self.money(self.total)
    }

    /// Subtotal in minor units.
    pub fn subtotal_minor(&self) -> u64 {
        self.subtotal
    }

    /// Discount in minor units.
    pub fn discount_minor(&self) -> u64 {
        self.discount
    }

    /// Displayed shipping in minor units.
    pub fn shipping_minor(&self) -> u64 {
        if self.free_shipping {
            0
        } else {
            self.shipping_fee
        }
    }

    /// Shipping fee in minor units, charged even under free shipping.
    pub fn shipping_fee_minor(&self) -> u64 {
        self.shipping_fee
    }

    /// Total in minor units.
    pub fn total_minor(&self) -> u64 {
        self.total
    }

    /// Currency all amounts are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Discount as a share of the subtotal.
    pub fn savings_percent(&self) -> Percentage {
        if self.subtotal == 0 {
            return Percentage::from(0.0);
        }

        let discount = Decimal::from_u64(self.discount).unwrap_or(Decimal::ZERO);
        let subtotal = Decimal::from_u64(self.subtotal).unwrap_or(Decimal::ONE);

        Percentage::from(discount / subtotal)
    }

    fn money(&self, minor: u64) -> Money<'static, Currency> {
        // Construction checked every amount against i64::MAX.
        Money::from_minor(i64::try_from(minor).unwrap_or(i64::MAX), self.currency)
    }
}

/// Price the selected subset of `items`.
///
/// Unselected items are excluded entirely. A free-shipping promotion reports
/// shipping as zero while its offset is carried in the discount.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: an amount exceeded the money representation.
/// - [`PricingError::Discount`]: the promotion's discount could not be computed.
pub fn price(
    items: &[LineItem],
    selection: &SelectionSet,
    promotion: Option<&Promotion>,
    shipping_fee: u64,
    currency: &'static Currency,
) -> Result<Totals, PricingError> {
    price_items(selection.filter(items), promotion, shipping_fee, currency)
}

/// Price every item yielded by `items`.
///
/// # Errors
///
/// See [`price`].
pub fn price_items<'a>(
    items: impl IntoIterator<Item = &'a LineItem>,
    promotion: Option<&Promotion>,
    shipping_fee: u64,
    currency: &'static Currency,
) -> Result<Totals, PricingError> {
    let subtotal = items.into_iter().try_fold(0_u64, |acc, item| {
        acc.checked_add(item.line_total())
            .ok_or(PricingError::Overflow)
    })?;

    let discount = promotion
        .map(|promotion| discount_amount(&promotion.discount, subtotal))
        .transpose()?
        .unwrap_or(0);

    let free_shipping = promotion.is_some_and(|promotion| promotion.discount.is_free_shipping());

    let total = subtotal
        .checked_add(shipping_fee)
        .ok_or(PricingError::Overflow)?
        .saturating_sub(discount);

    if [subtotal, discount, shipping_fee, total]
        .iter()
        .any(|amount| *amount > MONEY_LIMIT)
    {
        return Err(PricingError::Overflow);
    }

    Ok(Totals {
        subtotal,
        discount,
        shipping_fee,
        free_shipping,
        total,
        currency,
    })
}
