//! Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    accounts::{Account, AccountUuid, Address, AddressUuid, Profile, choose_default},
    discounts::DiscountError,
    items::{LineItem, LineItemUuid, Variant, VariantUuid},
    orders::{OrderConfirmation, OrderDetails, OrderLine, OrderRequest, OrderUuid},
    payments::{PaymentCategory, PaymentMethod, find_method},
    pricing::{PricingError, Totals, price, price_items},
    promotions::{AppliedPromotion, Discount, Promotion, PromotionError, resolve_code},
    selection::SelectionSet,
    summary::{OrderSummary, SummaryError},
    uuids::TypedUuid,
    validation::{MAX_NOTE_CHARS, MAX_QUANTITY, QuantityBounds, ValidationError},
};
