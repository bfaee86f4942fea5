//! Application configuration

use std::time::Duration;

use clap::Args;

use crate::{
    config::{
        cart::{CartConfig, HandoffConfig, PricingConfig, WalletConfig},
        observability::LoggingConfig,
        storefront::StorefrontConfig,
    },
    settings::{CheckoutSettings, SettingsError},
};

pub use observability::LogFormat;

pub mod cart;
pub mod observability;
pub mod storefront;

/// Storefront checkout configuration, read from CLI arguments and the
/// environment.
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Storefront API settings.
    #[command(flatten)]
    pub storefront: StorefrontConfig,

    /// Pricing settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Cart synchronization settings.
    #[command(flatten)]
    pub cart: CartConfig,

    /// Handoff storage settings.
    #[command(flatten)]
    pub handoff: HandoffConfig,

    /// Wallet deep link settings.
    #[command(flatten)]
    pub wallet: WalletConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Resolve the runtime settings the cart and checkout read.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a value is out of range or malformed.
    pub fn settings(&self) -> Result<CheckoutSettings, SettingsError> {
        CheckoutSettings::resolve(
            &self.pricing.currency,
            self.pricing.shipping_fee,
            self.pricing.max_quantity,
            Duration::from_millis(self.cart.quantity_quiet_period_ms),
            &self.wallet.wallet_deep_link_base,
        )
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        config: AppConfig,
    }

    #[test]
    fn defaults_resolve_to_vnd_settings() -> TestResult {
        let harness = Harness::try_parse_from([
            "checkout",
            "--storefront-api-url",
            "https://api.storefront.local/v1",
        ])?;

        let settings = harness.config.settings()?;

        assert_eq!(settings.currency.iso_alpha_code, "VND");
        assert_eq!(settings.shipping_fee, 30_000);
        assert_eq!(settings.max_quantity, 100);
        assert_eq!(settings.quiet_period, Duration::from_millis(500));
        assert_eq!(harness.config.logging.log_format, LogFormat::Compact);

        Ok(())
    }

    #[test]
    fn arguments_override_defaults() -> TestResult {
        let harness = Harness::try_parse_from([
            "checkout",
            "--storefront-api-url",
            "https://api.storefront.local/v1",
            "--shipping-fee",
            "15000",
            "--quantity-quiet-period-ms",
            "250",
            "--log-format",
            "json",
        ])?;

        let settings = harness.config.settings()?;

        assert_eq!(settings.shipping_fee, 15_000);
        assert_eq!(settings.quiet_period, Duration::from_millis(250));
        assert_eq!(harness.config.logging.log_format, LogFormat::Json);

        Ok(())
    }
}
