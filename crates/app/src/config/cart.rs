//! Cart & Checkout Config

use std::path::PathBuf;

use clap::Args;

/// Pricing settings.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// ISO 4217 currency code for every amount
    #[arg(long, env = "CHECKOUT_CURRENCY", default_value = "VND")]
    pub currency: String,

    /// Flat shipping fee in minor units
    #[arg(long, env = "CHECKOUT_SHIPPING_FEE", default_value_t = 30_000_u64)]
    pub shipping_fee: u64,

    /// Maximum quantity per cart line
    #[arg(long, env = "CHECKOUT_MAX_QUANTITY", default_value_t = 100_u32)]
    pub max_quantity: u32,
}

/// Cart synchronization settings.
#[derive(Debug, Clone, Args)]
pub struct CartConfig {
    /// Quiet period before a quantity change is sent, in milliseconds
    #[arg(long, env = "CART_QUANTITY_QUIET_PERIOD_MS", default_value_t = 500_u64)]
    pub quantity_quiet_period_ms: u64,
}

/// Checkout handoff storage settings.
#[derive(Debug, Clone, Args)]
pub struct HandoffConfig {
    /// Directory the checkout snapshot is written to
    #[arg(long, env = "CHECKOUT_HANDOFF_DIR", default_value = ".checkout")]
    pub handoff_dir: PathBuf,
}

/// E-wallet settings.
#[derive(Debug, Clone, Args)]
pub struct WalletConfig {
    /// Base URL for wallet payment deep links
    #[arg(
        long,
        env = "WALLET_DEEP_LINK_BASE",
        default_value = "https://qr.storefront.local/pay"
    )]
    pub wallet_deep_link_base: String,
}
