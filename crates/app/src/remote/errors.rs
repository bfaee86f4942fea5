//! Remote collaborator errors.

use checkout::validation::ValidationError;
use thiserror::Error;

use crate::errors::GENERIC_FAILURE_MESSAGE;

/// A payload from a remote collaborator failed boundary validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// A field failed a local validation rule.
    #[error(transparent)]
    Field(#[from] ValidationError),

    /// Line item quantity was zero.
    #[error("line item quantity must be at least 1")]
    ZeroQuantity,

    /// Discount kind is not one the pricing engine understands.
    #[error("unknown discount type {0}")]
    UnknownDiscountType(String),

    /// Percentage promotion outside `0..=100`.
    #[error("percentage discount {0} is out of range")]
    PercentageOutOfRange(u64),

    /// Payment category is not one the checkout flow understands.
    #[error("unknown payment category {0}")]
    UnknownPaymentCategory(String),

    /// More than one address claimed to be the default.
    #[error("address book has more than one default address")]
    MultipleDefaultAddresses,
}

/// Errors raised by remote collaborators.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure or an undecodable body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,

        /// Message extracted from the response body, or the raw body
        message: String,
    },

    /// The collaborator answered with data that failed validation.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),
}

impl RemoteError {
    /// Whether the collaborator reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Text safe to show the shopper: the collaborator's message when it sent
    /// one, else a generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Status { .. } | Self::Http(_) | Self::InvalidPayload(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}
