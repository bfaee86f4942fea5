//! Cart
//!
//! The shopper's cart: line items, the selection carried into checkout,
//! debounced quantity synchronization with the cart service, and promotion
//! codes.

pub use errors::CartError;
pub use events::CartEvent;
pub use promotions::CartPromotions;
pub use synchronizer::CartSynchronizer;

mod errors;
mod events;
mod pending;
mod promotions;
mod synchronizer;
