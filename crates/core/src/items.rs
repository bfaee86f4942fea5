//! Items

use serde::{Deserialize, Serialize};

use crate::{
    uuids::TypedUuid,
    validation::{QuantityBounds, ValidationError},
};

/// Line Item UUID
pub type LineItemUuid = TypedUuid<LineItem>;

/// Variant UUID
pub type VariantUuid = TypedUuid<Variant>;

/// A purchasable variant of a product, as embedded in a cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant identifier
    pub uuid: VariantUuid,

    /// Display name
    pub name: String,

    /// Current selling price in minor units
    pub unit_price: u64,

    /// Price before markdown in minor units
    pub original_price: u64,

    /// Size attribute, when the product has sizes
    pub size: Option<String>,

    /// Color attribute, when the product has colors
    pub color: Option<String>,

    /// Units available for sale
    pub stock: u32,

    /// Image reference for display
    pub image: Option<String>,
}

impl Variant {
    /// Whether the variant is currently marked down.
    pub fn is_on_sale(&self) -> bool {
        self.original_price > self.unit_price
    }

    /// Human readable attribute list, e.g. `"M / Navy"`.
    pub fn attributes(&self) -> Option<String> {
        match (self.size.as_deref(), self.color.as_deref()) {
            (Some(size), Some(color)) => Some(format!("{size} / {color}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

/// One entry in a cart: a variant and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Cart entry identifier
    pub uuid: LineItemUuid,

    /// The variant being purchased
    pub variant: Variant,

    /// Number of units, always at least one
    pub quantity: u32,
}

impl LineItem {
    /// Unit price multiplied by quantity, in minor units.
    ///
    /// Saturates rather than wrapping on absurd inputs.
    pub fn line_total(&self) -> u64 {
        self.variant
            .unit_price
            .saturating_mul(u64::from(self.quantity))
    }

    /// Bounds a quantity change for this item must respect.
    pub fn quantity_bounds(&self, cap: u32) -> QuantityBounds {
        QuantityBounds::new(cap, self.variant.stock)
    }

    /// Check a requested quantity against this item's bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuantityOutOfRange`] when `quantity` is zero or
    /// exceeds `min(cap, stock)`.
    pub fn validate_quantity(&self, quantity: u32, cap: u32) -> Result<(), ValidationError> {
        self.quantity_bounds(cap).check(quantity)
    }
}
