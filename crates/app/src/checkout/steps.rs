//! Checkout steps.

use checkout::orders::OrderConfirmation;

use crate::checkout::wallet::WalletReference;

/// Where the shopper is in checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Choosing a shipping address and writing an optional note.
    ShippingInfo,

    /// Choosing how to pay.
    PaymentSelection,

    /// Waiting for the shopper to confirm in their wallet app.
    WalletConfirmation {
        /// Link and token shown to the shopper
        reference: WalletReference,
    },

    /// The order was created.
    Completed {
        /// The order service's confirmation
        order: OrderConfirmation,
    },
}

impl Step {
    /// Short name used in logs and errors.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ShippingInfo => "shipping info",
            Self::PaymentSelection => "payment selection",
            Self::WalletConfirmation { .. } => "wallet confirmation",
            Self::Completed { .. } => "completed",
        }
    }

    /// Whether the order has been placed.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}
