//! Wire payloads exchanged with remote collaborators.
//!
//! Incoming payloads are validated field by field when converted to domain
//! types; nothing unchecked reaches the cart or checkout state.

use checkout::{
    accounts::{AccountUuid, Address, AddressUuid, Profile},
    items::{LineItem, LineItemUuid, Variant, VariantUuid},
    orders::{OrderConfirmation, OrderUuid},
    payments::{PaymentCategory, PaymentMethod},
    promotions::{Discount, Promotion},
    validation::require_text,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::remote::errors::PayloadError;

/// Body of a quantity update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartItemUpdate {
    /// Variant the line refers to
    pub variant_uuid: VariantUuid,

    /// Requested quantity
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartPayload {
    pub(crate) items: Vec<LineItemPayload>,
}

impl TryFrom<CartPayload> for Vec<LineItem> {
    type Error = PayloadError;

    fn try_from(payload: CartPayload) -> Result<Self, Self::Error> {
        payload.items.into_iter().map(LineItem::try_from).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LineItemPayload {
    pub(crate) uuid: Uuid,
    pub(crate) quantity: u32,
    pub(crate) variant: VariantPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariantPayload {
    pub(crate) uuid: Uuid,
    pub(crate) name: String,
    pub(crate) unit_price: u64,
    pub(crate) original_price: Option<u64>,
    pub(crate) size: Option<String>,
    pub(crate) color: Option<String>,
    pub(crate) stock: u32,
    pub(crate) image: Option<String>,
}

impl TryFrom<LineItemPayload> for LineItem {
    type Error = PayloadError;

    fn try_from(payload: LineItemPayload) -> Result<Self, Self::Error> {
        if payload.quantity == 0 {
            return Err(PayloadError::ZeroQuantity);
        }

        let variant = payload.variant;

        Ok(LineItem {
            uuid: LineItemUuid::from_uuid(payload.uuid),
            variant: Variant {
                uuid: VariantUuid::from_uuid(variant.uuid),
                name: require_text("variant name", variant.name)?,
                unit_price: variant.unit_price,
                original_price: variant.original_price.unwrap_or(variant.unit_price),
                size: variant.size,
                color: variant.color,
                stock: variant.stock,
                image: variant.image,
            },
            quantity: payload.quantity,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromotionPayload {
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) discount_type: String,
    pub(crate) discount_value: u64,
}

impl TryFrom<PromotionPayload> for Promotion {
    type Error = PayloadError;

    fn try_from(payload: PromotionPayload) -> Result<Self, Self::Error> {
        let discount = match payload.discount_type.as_str() {
            "percentage" => Discount::PercentageOff {
                percentage: u8::try_from(payload.discount_value)
                    .ok()
                    .filter(|percentage| *percentage <= 100)
                    .ok_or(PayloadError::PercentageOutOfRange(payload.discount_value))?,
            },
            "fixed_amount" => Discount::FixedAmountOff {
                amount: payload.discount_value,
            },
            "free_shipping" => Discount::FreeShipping {
                amount: payload.discount_value,
            },
            other => return Err(PayloadError::UnknownDiscountType(other.to_string())),
        };

        Ok(Promotion {
            code: require_text("promotion code", payload.code)?,
            description: payload.description,
            discount,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentMethodPayload {
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) category: String,
    pub(crate) provider: Option<String>,
}

impl TryFrom<PaymentMethodPayload> for PaymentMethod {
    type Error = PayloadError;

    fn try_from(payload: PaymentMethodPayload) -> Result<Self, Self::Error> {
        let category = match payload.category.as_str() {
            "credit_card" => PaymentCategory::CreditCard,
            "bank_transfer" => PaymentCategory::BankTransfer,
            "e_wallet" => PaymentCategory::EWallet,
            "cash_on_delivery" => PaymentCategory::CashOnDelivery,
            other => return Err(PayloadError::UnknownPaymentCategory(other.to_string())),
        };

        Ok(PaymentMethod {
            code: require_text("payment method code", payload.code)?,
            name: require_text("payment method name", payload.name)?,
            category,
            provider: payload.provider,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfilePayload {
    pub(crate) uuid: Uuid,
    pub(crate) display_name: String,
    #[serde(default)]
    pub(crate) addresses: Vec<AddressPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressPayload {
    pub(crate) uuid: Uuid,
    pub(crate) full_name: String,
    pub(crate) phone: String,
    pub(crate) address: String,
    #[serde(default)]
    pub(crate) is_default: bool,
}

impl TryFrom<AddressPayload> for Address {
    type Error = PayloadError;

    fn try_from(payload: AddressPayload) -> Result<Self, Self::Error> {
        Ok(Address {
            uuid: AddressUuid::from_uuid(payload.uuid),
            full_name: require_text("full name", payload.full_name)?,
            phone: require_text("phone", payload.phone)?,
            address: require_text("address", payload.address)?,
            is_default: payload.is_default,
        })
    }
}

impl TryFrom<ProfilePayload> for Profile {
    type Error = PayloadError;

    fn try_from(payload: ProfilePayload) -> Result<Self, Self::Error> {
        let addresses = payload
            .addresses
            .into_iter()
            .map(Address::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if addresses.iter().filter(|address| address.is_default).count() > 1 {
            return Err(PayloadError::MultipleDefaultAddresses);
        }

        Ok(Profile {
            account: AccountUuid::from_uuid(payload.uuid),
            display_name: payload.display_name,
            addresses,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderCreatedPayload {
    pub(crate) order_uuid: Uuid,
}

impl From<OrderCreatedPayload> for OrderConfirmation {
    fn from(payload: OrderCreatedPayload) -> Self {
        Self {
            order_uuid: OrderUuid::from_uuid(payload.order_uuid),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorPayload {
    pub(crate) message: Option<String>,
    pub(crate) error: Option<String>,
}

/// Pull a shopper-facing message out of an error response body.
///
/// JSON bodies with `message` or `error` fields use that field; anything else
/// falls back to the trimmed raw body.
pub(crate) fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorPayload>(body).unwrap_or_default();

    parsed
        .message
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use checkout::validation::ValidationError;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn line_item_json(quantity: u32) -> serde_json::Value {
        json!({
            "uuid": Uuid::now_v7(),
            "quantity": quantity,
            "variant": {
                "uuid": Uuid::now_v7(),
                "name": "Linen Shirt",
                "unit_price": 200_000,
                "size": "M",
                "stock": 12
            }
        })
    }

    #[test]
    fn line_item_defaults_original_price_to_unit_price() -> TestResult {
        let payload: LineItemPayload = serde_json::from_value(line_item_json(2))?;
        let item = LineItem::try_from(payload)?;

        assert_eq!(item.quantity, 2);
        assert_eq!(item.variant.original_price, 200_000);
        assert!(!item.variant.is_on_sale());

        Ok(())
    }

    #[test]
    fn line_item_rejects_zero_quantity() -> TestResult {
        let payload: LineItemPayload = serde_json::from_value(line_item_json(0))?;

        assert_eq!(
            LineItem::try_from(payload),
            Err(PayloadError::ZeroQuantity)
        );

        Ok(())
    }

    #[test]
    fn negative_quantity_fails_to_decode() {
        let mut value = line_item_json(1);
        value["quantity"] = json!(-3);

        assert!(serde_json::from_value::<LineItemPayload>(value).is_err());
    }

    #[test]
    fn promotion_kinds_map_to_discounts() -> TestResult {
        let payload: PromotionPayload = serde_json::from_value(json!({
            "code": "FREESHIP",
            "discount_type": "free_shipping",
            "discount_value": 30_000
        }))?;

        let promotion = Promotion::try_from(payload)?;

        assert_eq!(promotion.discount, Discount::FreeShipping { amount: 30_000 });
        assert!(promotion.description.is_empty());

        Ok(())
    }

    #[test]
    fn promotion_rejects_percentage_over_hundred() -> TestResult {
        let payload: PromotionPayload = serde_json::from_value(json!({
            "code": "HUGE",
            "discount_type": "percentage",
            "discount_value": 150
        }))?;

        assert_eq!(
            Promotion::try_from(payload),
            Err(PayloadError::PercentageOutOfRange(150))
        );

        Ok(())
    }

    #[test]
    fn promotion_rejects_unknown_kind() -> TestResult {
        let payload: PromotionPayload = serde_json::from_value(json!({
            "code": "BOGO",
            "discount_type": "buy_one_get_one",
            "discount_value": 1
        }))?;

        assert!(matches!(
            Promotion::try_from(payload),
            Err(PayloadError::UnknownDiscountType(kind)) if kind == "buy_one_get_one"
        ));

        Ok(())
    }

    #[test]
    fn payment_method_parses_wallet_category() -> TestResult {
        let payload: PaymentMethodPayload = serde_json::from_value(json!({
            "code": "momo",
            "name": "MoMo",
            "category": "e_wallet",
            "provider": "momo"
        }))?;

        let method = PaymentMethod::try_from(payload)?;

        assert!(method.category.requires_wallet_confirmation());

        Ok(())
    }

    #[test]
    fn profile_rejects_blank_phone() -> TestResult {
        let payload: ProfilePayload = serde_json::from_value(json!({
            "uuid": Uuid::now_v7(),
            "display_name": "An",
            "addresses": [{
                "uuid": Uuid::now_v7(),
                "full_name": "Nguyen Van A",
                "phone": " ",
                "address": "12 Ly Thuong Kiet"
            }]
        }))?;

        assert_eq!(
            Profile::try_from(payload),
            Err(PayloadError::Field(ValidationError::EmptyField("phone")))
        );

        Ok(())
    }

    #[test]
    fn profile_rejects_two_defaults() -> TestResult {
        let address = |uuid: Uuid| {
            json!({
                "uuid": uuid,
                "full_name": "Nguyen Van A",
                "phone": "0901234567",
                "address": "12 Ly Thuong Kiet",
                "is_default": true
            })
        };

        let payload: ProfilePayload = serde_json::from_value(json!({
            "uuid": Uuid::now_v7(),
            "display_name": "An",
            "addresses": [address(Uuid::now_v7()), address(Uuid::now_v7())]
        }))?;

        assert_eq!(
            Profile::try_from(payload),
            Err(PayloadError::MultipleDefaultAddresses)
        );

        Ok(())
    }

    #[test]
    fn error_message_reads_json_or_raw_body() {
        assert_eq!(
            error_message(r#"{"message":"Promotion expired"}"#),
            "Promotion expired"
        );
        assert_eq!(error_message(r#"{"error":"out of stock"}"#), "out of stock");
        assert_eq!(error_message(" bad gateway \n"), "bad gateway");
    }
}
