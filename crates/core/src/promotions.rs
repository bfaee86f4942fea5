//! Promotions
//!
//! Promotion codes are resolved against a catalog fetched once per session. At
//! most one promotion is applied at a time, and an applied promotion is always
//! a member of that catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from promotion code resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// No promotion in the catalog has exactly this code.
    #[error("promotion code {0} is not valid")]
    NotFound(String),
}

/// How a promotion reduces the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the subtotal, e.g. `10` for 10% off
    PercentageOff {
        /// Whole percent, `0..=100`
        percentage: u8,
    },

    /// Fixed amount off the order in minor units
    FixedAmountOff {
        /// Amount in minor units
        amount: u64,
    },

    /// Offsets the shipping fee by `amount` minor units
    FreeShipping {
        /// Shipping offset in minor units
        amount: u64,
    },
}

impl Discount {
    /// Short machine name of the discount kind.
    pub const fn kind_as_str(&self) -> &'static str {
        match self {
            Self::PercentageOff { .. } => "percentage",
            Self::FixedAmountOff { .. } => "fixed_amount",
            Self::FreeShipping { .. } => "free_shipping",
        }
    }

    /// Whether this discount waives shipping for display.
    pub const fn is_free_shipping(&self) -> bool {
        matches!(self, Self::FreeShipping { .. })
    }
}

/// A code-activated discount rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Code the shopper types in
    pub code: String,

    /// Human readable description
    pub description: String,

    /// The discount rule
    pub discount: Discount,
}

/// Find the promotion whose code matches `code` exactly.
///
/// Leading and trailing whitespace in the shopper's input is ignored; the
/// comparison itself is case-sensitive.
///
/// # Errors
///
/// Returns [`PromotionError::NotFound`] when no promotion matches.
pub fn resolve_code<'a>(
    code: &str,
    catalog: &'a [Promotion],
) -> Result<&'a Promotion, PromotionError> {
    let code = code.trim();

    catalog
        .iter()
        .find(|promotion| promotion.code == code)
        .ok_or_else(|| PromotionError::NotFound(code.to_string()))
}

/// The single promotion currently applied to a cart, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedPromotion {
    current: Option<Promotion>,
}

impl AppliedPromotion {
    /// Nothing applied.
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolve `code` and install the match, replacing any prior promotion.
    ///
    /// On failure the currently applied promotion is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::NotFound`] when the code is not in `catalog`.
    pub fn apply(
        &mut self,
        code: &str,
        catalog: &[Promotion],
    ) -> Result<&Promotion, PromotionError> {
        let promotion = resolve_code(code, catalog)?;

        Ok(self.current.insert(promotion.clone()))
    }

    /// Clear the applied promotion.
    pub fn remove(&mut self) {
        self.current = None;
    }

    /// The applied promotion.
    pub fn get(&self) -> Option<&Promotion> {
        self.current.as_ref()
    }

    /// Consume into the applied promotion.
    pub fn into_inner(self) -> Option<Promotion> {
        self.current
    }
}

impl From<Option<Promotion>> for AppliedPromotion {
    fn from(current: Option<Promotion>) -> Self {
        Self { current }
    }
}
