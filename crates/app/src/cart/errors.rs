//! Cart Errors

use thiserror::Error;

use checkout::{pricing::PricingError, promotions::PromotionError, validation::ValidationError};

use crate::{
    errors::{ErrorKind, GENERIC_FAILURE_MESSAGE},
    handoff::HandoffError,
    remote::RemoteError,
};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Local validation failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The cart service rejected or failed the call; local state is unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The promotion code is not in the catalog.
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// Proceeding to checkout with nothing selected.
    #[error("no items selected for checkout")]
    EmptySelection,

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The checkout snapshot could not be frozen.
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

impl CartError {
    /// User-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Pricing(_) => ErrorKind::Validation,
            Self::Remote(error) if error.is_not_found() => ErrorKind::NotFound,
            Self::Remote(_) | Self::Handoff(_) => ErrorKind::RemoteFailure,
            Self::Promotion(_) => ErrorKind::NotFound,
            Self::EmptySelection => ErrorKind::EmptySelection,
        }
    }

    /// Text shown to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::Remote(error) => error.user_message(),
            Self::Promotion(error) => error.to_string(),
            Self::EmptySelection => "Select at least one item to check out.".to_string(),
            Self::Pricing(_) | Self::Handoff(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
