//! Checkout Errors

use thiserror::Error;

use checkout::{pricing::PricingError, validation::ValidationError};

use crate::{
    errors::{ErrorKind, GENERIC_FAILURE_MESSAGE},
    handoff::HandoffError,
    remote::RemoteError,
};

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A step's input is missing or invalid; the step is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A remote call failed; the step is unchanged and may be retried.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Checkout was started without any items.
    #[error("checkout has no items")]
    EmptySelection,

    /// The action is not available in the current step.
    #[error("cannot {action} during {step}")]
    InvalidStep {
        /// Attempted action
        action: &'static str,

        /// Step the flow is in
        step: &'static str,
    },

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The checkout snapshot could not be read.
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

impl CheckoutError {
    /// User-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidStep { .. } | Self::Pricing(_) => {
                ErrorKind::Validation
            }
            Self::Remote(error) if error.is_not_found() => ErrorKind::NotFound,
            Self::Remote(_) | Self::Handoff(_) => ErrorKind::RemoteFailure,
            Self::EmptySelection => ErrorKind::EmptySelection,
        }
    }

    /// Text shown to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::Remote(error) => error.user_message(),
            Self::EmptySelection => "Your checkout is empty. Return to the cart.".to_string(),
            Self::InvalidStep { .. } | Self::Pricing(_) | Self::Handoff(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}
