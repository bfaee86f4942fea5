//! Payment Methods

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad family a payment method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    /// Card entered at checkout
    CreditCard,

    /// Manual bank transfer
    BankTransfer,

    /// QR-code wallet confirmed in an external app
    EWallet,

    /// Paid to the courier
    CashOnDelivery,
}

impl PaymentCategory {
    /// Whether the flow needs an out-of-band wallet confirmation step.
    pub const fn requires_wallet_confirmation(self) -> bool {
        matches!(self, Self::EWallet)
    }

    /// Machine name, matching the wire format.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::BankTransfer => "bank_transfer",
            Self::EWallet => "e_wallet",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A way to pay, from the catalog fetched once per checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Stable method code, e.g. `"momo"`
    pub code: String,

    /// Display name
    pub name: String,

    /// Method family
    pub category: PaymentCategory,

    /// Icon or provider reference
    pub provider: Option<String>,
}

/// Look up a payment method by code.
pub fn find_method<'a>(catalog: &'a [PaymentMethod], code: &str) -> Option<&'a PaymentMethod> {
    catalog.iter().find(|method| method.code == code)
}
