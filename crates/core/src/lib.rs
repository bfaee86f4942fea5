//! Checkout
//!
//! Pure order-assembly domain for the storefront checkout: line items and the
//! shopper's selection, promotion code resolution, and the pricing engine that
//! derives subtotal, discount, shipping and total.

pub mod accounts;
pub mod discounts;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod items;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod selection;
pub mod summary;
pub mod uuids;
pub mod validation;
