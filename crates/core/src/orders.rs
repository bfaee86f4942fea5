//! Orders

use serde::{Deserialize, Serialize};

use crate::{
    accounts::{AccountUuid, AddressUuid},
    items::{LineItem, VariantUuid},
    pricing::Totals,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderConfirmation>;

/// One purchased line in an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Variant purchased
    pub variant_uuid: VariantUuid,

    /// Units purchased
    pub quantity: u32,

    /// Unit price at the time of ordering, in minor units
    pub unit_price: u64,

    /// `unit_price × quantity`, in minor units
    pub line_total: u64,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        Self {
            variant_uuid: item.variant.uuid,
            quantity: item.quantity,
            unit_price: item.variant.unit_price,
            line_total: item.line_total(),
        }
    }
}

/// Shopper choices collected by the checkout flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    /// Ordering account
    pub account: AccountUuid,

    /// Shipping address
    pub address: AddressUuid,

    /// Selected payment method code
    pub payment_method: String,

    /// Applied promotion code
    pub promotion_code: Option<String>,

    /// Free-text note
    pub note: Option<String>,

    /// Wallet order token shown to the shopper, when one was generated
    pub payment_token: Option<String>,
}

/// Outbound order submitted to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Ordering account
    pub account_uuid: AccountUuid,

    /// Shipping address
    pub address_uuid: AddressUuid,

    /// Subtotal in minor units
    pub subtotal: u64,

    /// Discount in minor units
    pub discount: u64,

    /// Shipping fee charged, in minor units
    ///
    /// A free-shipping promotion offsets the fee through `discount`, so
    /// `subtotal - discount + shipping` equals `total` unless the total was
    /// floored at zero.
    pub shipping: u64,

    /// Amount payable in minor units
    pub total: u64,

    /// Payment method code
    pub payment_method: String,

    /// Applied promotion code
    pub promotion_code: Option<String>,

    /// Order note
    pub note: Option<String>,

    /// ISO 4217 alpha code
    pub currency: String,

    /// Wallet order token
    pub payment_token: Option<String>,

    /// Purchased lines
    pub items: Vec<OrderLine>,
}

impl OrderRequest {
    /// Assemble a request from checkout choices, frozen items and their totals.
    pub fn build(details: OrderDetails, items: &[LineItem], totals: &Totals) -> Self {
        Self {
            account_uuid: details.account,
            address_uuid: details.address,
            subtotal: totals.subtotal_minor(),
            discount: totals.discount_minor(),
            shipping: totals.shipping_fee_minor(),
            total: totals.total_minor(),
            payment_method: details.payment_method,
            promotion_code: details.promotion_code,
            note: details.note,
            currency: totals.currency().iso_alpha_code.to_string(),
            payment_token: details.payment_token,
            items: items.iter().map(OrderLine::from).collect(),
        }
    }
}

/// The order service's acknowledgement of a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Created order identifier
    pub order_uuid: OrderUuid,
}
