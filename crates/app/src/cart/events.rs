//! Cart notifications.

use checkout::items::LineItemUuid;

/// Something the shopper should be told about after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The cart service stored a quantity change.
    QuantityConfirmed {
        /// Updated line
        item: LineItemUuid,

        /// Quantity now stored
        quantity: u32,
    },

    /// The cart service refused a quantity change and the display was rolled back.
    QuantityRejected {
        /// Affected line
        item: LineItemUuid,

        /// Quantity shown again
        restored: u32,

        /// Reason to show the shopper
        message: String,
    },

    /// A line was deleted.
    ItemRemoved {
        /// Deleted line
        item: LineItemUuid,
    },
}
