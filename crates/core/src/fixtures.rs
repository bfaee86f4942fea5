//! Fixtures
//!
//! Small constructors for carts, promotions, addresses and payment methods,
//! shared by this crate's tests and by downstream crates through the
//! `fixtures` feature.

use crate::{
    accounts::{Address, AddressUuid},
    items::{LineItem, LineItemUuid, Variant, VariantUuid},
    payments::{PaymentCategory, PaymentMethod},
    promotions::{Discount, Promotion},
};

/// Stock given to fixture variants unless stated otherwise.
pub const FIXTURE_STOCK: u32 = 50;

/// A line item with a generated name and ample stock.
pub fn line_item(unit_price: u64, quantity: u32) -> LineItem {
    line_item_named("Fixture Variant", unit_price, quantity)
}

/// A named line item with ample stock.
pub fn line_item_named(name: &str, unit_price: u64, quantity: u32) -> LineItem {
    line_item_with_stock(name, unit_price, quantity, FIXTURE_STOCK)
}

/// A line item with an explicit stock level.
pub fn line_item_with_stock(name: &str, unit_price: u64, quantity: u32, stock: u32) -> LineItem {
    LineItem {
        uuid: LineItemUuid::now_v7(),
        variant: Variant {
            uuid: VariantUuid::now_v7(),
            name: name.to_string(),
            unit_price,
            original_price: unit_price,
            size: None,
            color: None,
            stock,
            image: None,
        },
        quantity,
    }
}

/// A whole-percent promotion.
pub fn percentage_off(code: &str, percentage: u8) -> Promotion {
    Promotion {
        code: code.to_string(),
        description: format!("{percentage}% off"),
        discount: Discount::PercentageOff { percentage },
    }
}

/// A fixed amount promotion.
pub fn fixed_amount_off(code: &str, amount: u64) -> Promotion {
    Promotion {
        code: code.to_string(),
        description: format!("{amount} off"),
        discount: Discount::FixedAmountOff { amount },
    }
}

/// A free-shipping promotion offsetting `amount`.
pub fn free_shipping(code: &str, amount: u64) -> Promotion {
    Promotion {
        code: code.to_string(),
        description: "Free shipping".to_string(),
        discount: Discount::FreeShipping { amount },
    }
}

/// `SAVE10` (10%), `FREESHIP` (30 000) and `FLAT50K` (50 000).
pub fn promotion_catalog() -> Vec<Promotion> {
    vec![
        percentage_off("SAVE10", 10),
        free_shipping("FREESHIP", 30_000),
        fixed_amount_off("FLAT50K", 50_000),
    ]
}

/// An address, optionally flagged as the default.
pub fn address(is_default: bool) -> Address {
    Address {
        uuid: AddressUuid::now_v7(),
        full_name: "Nguyen Van A".to_string(),
        phone: "0901234567".to_string(),
        address: "12 Ly Thuong Kiet, Hoan Kiem, Ha Noi".to_string(),
        is_default,
    }
}

/// A payment method in the given category.
pub fn payment_method(code: &str, category: PaymentCategory) -> PaymentMethod {
    PaymentMethod {
        code: code.to_string(),
        name: code.to_uppercase(),
        category,
        provider: Some(code.to_string()),
    }
}

/// Cash on delivery, a card, and a wallet, in that order.
pub fn payment_catalog() -> Vec<PaymentMethod> {
    vec![
        payment_method("cod", PaymentCategory::CashOnDelivery),
        payment_method("visa", PaymentCategory::CreditCard),
        payment_method("momo", PaymentCategory::EWallet),
    ]
}
