//! Runtime checkout settings resolved from configuration.

use std::time::Duration;

use reqwest::Url;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

use checkout::validation::MAX_QUANTITY;

/// Flat shipping fee applied to every order, in minor units.
pub const DEFAULT_SHIPPING_FEE: u64 = 30_000;

/// Quiet period after the last quantity change before it is sent.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Errors resolving settings from configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The currency code is not a known ISO 4217 alpha code.
    #[error("unknown currency code {0}")]
    UnknownCurrency(String),

    /// The currency has minor units, which the order service does not accept.
    #[error("currency {0} must have no minor units")]
    FractionalCurrency(String),

    /// The wallet deep link base is not a valid URL.
    #[error("invalid wallet deep link base {url}: {reason}")]
    InvalidWalletLink {
        /// The configured value
        url: String,

        /// Parser message
        reason: String,
    },

    /// The quantity cap was zero.
    #[error("max quantity must be at least 1")]
    ZeroMaxQuantity,
}

/// Values the cart and checkout flows read at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSettings {
    /// Currency every amount is expressed in.
    pub currency: &'static Currency,

    /// Flat shipping fee in minor units.
    pub shipping_fee: u64,

    /// Absolute per-line quantity cap.
    pub max_quantity: u32,

    /// Debounce window for quantity updates.
    pub quiet_period: Duration,

    /// Base URL wallet deep links are built on.
    pub wallet_link_base: Url,
}

impl CheckoutSettings {
    /// Settings with the default fee, cap and quiet period.
    pub fn new(currency: &'static Currency, wallet_link_base: Url) -> Self {
        Self {
            currency,
            shipping_fee: DEFAULT_SHIPPING_FEE,
            max_quantity: MAX_QUANTITY,
            quiet_period: DEFAULT_QUIET_PERIOD,
            wallet_link_base,
        }
    }

    /// Resolve raw configuration values.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::UnknownCurrency`]: `currency` is not ISO 4217.
    /// - [`SettingsError::FractionalCurrency`]: `currency` has minor units.
    /// - [`SettingsError::InvalidWalletLink`]: `wallet_link_base` is not a URL.
    /// - [`SettingsError::ZeroMaxQuantity`]: `max_quantity` is zero.
    pub fn resolve(
        currency: &str,
        shipping_fee: u64,
        max_quantity: u32,
        quiet_period: Duration,
        wallet_link_base: &str,
    ) -> Result<Self, SettingsError> {
        let currency = iso::find(currency)
            .ok_or_else(|| SettingsError::UnknownCurrency(currency.to_string()))?;

        if currency.exponent != 0 {
            return Err(SettingsError::FractionalCurrency(
                currency.iso_alpha_code.to_string(),
            ));
        }

        if max_quantity == 0 {
            return Err(SettingsError::ZeroMaxQuantity);
        }

        let wallet_link_base =
            Url::parse(wallet_link_base).map_err(|source| SettingsError::InvalidWalletLink {
                url: wallet_link_base.to_string(),
                reason: source.to_string(),
            })?;

        Ok(Self {
            currency,
            shipping_fee,
            max_quantity,
            quiet_period,
            wallet_link_base,
        })
    }
}
