//! E-wallet confirmation references.

use reqwest::Url;
use uuid::Uuid;

use checkout::{payments::PaymentMethod, pricing::Totals};

/// Generate a fresh order token for a wallet payment.
pub fn order_token() -> String {
    format!("ord_{}", Uuid::now_v7().simple())
}

/// What the shopper scans or opens to confirm a wallet payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletReference {
    /// Wallet provider the link targets
    pub provider: String,

    /// Amount payable in minor units
    pub amount: u64,

    /// Order token, also carried in the order request
    pub token: String,

    /// Link encoding provider, amount, currency and token
    pub deep_link: Url,
}

impl WalletReference {
    /// Build a reference for paying `totals` with `method`.
    pub fn new(base: &Url, method: &PaymentMethod, totals: &Totals, token: String) -> Self {
        let provider = method
            .provider
            .clone()
            .unwrap_or_else(|| method.code.clone());
        let amount = totals.total_minor();

        let mut deep_link = base.clone();

        deep_link
            .query_pairs_mut()
            .append_pair("provider", &provider)
            .append_pair("amount", &amount.to_string())
            .append_pair("currency", totals.currency().iso_alpha_code)
            .append_pair("token", &token);

        Self {
            provider,
            amount,
            token,
            deep_link,
        }
    }
}
