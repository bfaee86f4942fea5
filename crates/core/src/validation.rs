//! Validation
//!
//! Local checks that block a transition before anything is sent to a remote
//! service.

use thiserror::Error;

/// Absolute per-line quantity cap, independent of stock.
pub const MAX_QUANTITY: u32 = 100;

/// Longest order note accepted, in characters.
pub const MAX_NOTE_CHARS: usize = 500;

/// Validation failures surfaced inline to the shopper.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Requested quantity falls outside `1..=max`.
    #[error("quantity must be between 1 and {max}, got {requested}")]
    QuantityOutOfRange {
        /// The rejected quantity
        requested: u32,

        /// Largest quantity allowed for the line
        max: u32,
    },

    /// The referenced line item is not in the cart.
    #[error("item is no longer in the cart")]
    UnknownItem,

    /// Advancing from shipping info without an address.
    #[error("choose a shipping address to continue")]
    NoAddressSelected,

    /// The address does not belong to the account.
    #[error("address is not in the address book")]
    UnknownAddress,

    /// Advancing from payment selection without a method.
    #[error("choose a payment method to continue")]
    NoPaymentMethodSelected,

    /// The payment method code is not in the fetched catalog.
    #[error("payment method {0} is not available")]
    UnknownPaymentMethod(String),

    /// The order note exceeds [`MAX_NOTE_CHARS`].
    #[error("note must be at most {max} characters")]
    NoteTooLong {
        /// Maximum accepted characters
        max: usize,
    },

    /// A required text field was blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Inclusive range a line quantity must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityBounds {
    max: u32,
}

impl QuantityBounds {
    /// Bounds for a line with the given absolute cap and stock level.
    pub fn new(cap: u32, stock: u32) -> Self {
        Self {
            max: cap.min(stock),
        }
    }

    /// Largest allowed quantity. Zero when the variant is out of stock.
    pub fn max(self) -> u32 {
        self.max
    }

    /// Check `quantity` falls within `1..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuantityOutOfRange`] otherwise.
    pub fn check(self, quantity: u32) -> Result<(), ValidationError> {
        if (1..=self.max).contains(&quantity) {
            Ok(())
        } else {
            Err(ValidationError::QuantityOutOfRange {
                requested: quantity,
                max: self.max,
            })
        }
    }
}

/// Normalise a free-text order note. Blank notes become `None`.
///
/// # Errors
///
/// Returns [`ValidationError::NoteTooLong`] when the trimmed note exceeds
/// [`MAX_NOTE_CHARS`].
pub fn normalize_note(note: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = note.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > MAX_NOTE_CHARS {
        return Err(ValidationError::NoteTooLong {
            max: MAX_NOTE_CHARS,
        });
    }

    Ok(Some(trimmed.to_string()))
}

/// Require a text field to contain something other than whitespace.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyField`] naming `field` when blank.
pub fn require_text(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(value)
    }
}
