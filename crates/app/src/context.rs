//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    checkout::CheckoutServices,
    config::AppConfig,
    handoff::{CheckoutHandoff, FileStore},
    remote::{AccountsApi, CartApi, HttpStorefront, OrdersApi, PaymentMethodsApi, PromotionsApi},
    settings::{CheckoutSettings, SettingsError},
};

/// Errors building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// Configuration values could not be resolved.
    #[error("invalid checkout settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Collaborators and settings shared by the cart and checkout flows.
#[derive(Clone)]
pub struct AppContext {
    /// Cart persistence
    pub cart: Arc<dyn CartApi>,

    /// Promotion catalog
    pub promotions: Arc<dyn PromotionsApi>,

    /// Payment method catalog
    pub payment_methods: Arc<dyn PaymentMethodsApi>,

    /// Order creation
    pub orders: Arc<dyn OrdersApi>,

    /// Account profiles
    pub accounts: Arc<dyn AccountsApi>,

    /// Cart-to-checkout handoff
    pub handoff: CheckoutHandoff,

    /// Runtime settings
    pub settings: Arc<CheckoutSettings>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context backed by the storefront REST API and a
    /// file-based handoff.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured settings are invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let settings = Arc::new(config.settings()?);
        let storefront = Arc::new(HttpStorefront::new(config.storefront.endpoint()));
        let handoff = CheckoutHandoff::new(Arc::new(FileStore::new(&config.handoff.handoff_dir)));

        Ok(Self {
            cart: storefront.clone(),
            promotions: storefront.clone(),
            payment_methods: storefront.clone(),
            orders: storefront.clone(),
            accounts: storefront,
            handoff,
            settings,
        })
    }

    /// Collaborators a checkout needs.
    pub fn checkout_services(&self) -> CheckoutServices {
        CheckoutServices {
            payment_methods: Arc::clone(&self.payment_methods),
            orders: Arc::clone(&self.orders),
        }
    }
}
