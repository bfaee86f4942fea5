//! Checkout
//!
//! Multi-step flow from a frozen cart snapshot to a created order:
//! shipping info, payment selection, an optional wallet confirmation, then
//! completion.

pub use errors::CheckoutError;
pub use machine::{Checkout, CheckoutServices};
pub use steps::Step;
pub use wallet::{WalletReference, order_token};

mod errors;
mod machine;
mod steps;
mod wallet;
