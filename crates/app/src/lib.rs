//! Storefront checkout application layer: remote collaborators, the cart
//! synchronizer, the cart-to-checkout handoff and the checkout flow.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod context;
pub mod errors;
pub mod handoff;
pub mod observability;
pub mod remote;
pub mod session;
pub mod settings;
