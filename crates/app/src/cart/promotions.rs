//! Promotion codes entered in the cart view.

use tracing::{info, instrument};

use checkout::promotions::{AppliedPromotion, Promotion};

use crate::{cart::errors::CartError, remote::PromotionsApi};

/// The promotion catalog fetched for a session, and the code applied from it.
#[derive(Debug, Clone, Default)]
pub struct CartPromotions {
    catalog: Vec<Promotion>,
    applied: AppliedPromotion,
}

impl CartPromotions {
    /// Fetch the catalog once. Nothing is applied yet.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Remote`] when the catalog cannot be fetched.
    #[instrument(name = "cart.load_promotions", skip(api), err)]
    pub async fn load(api: &dyn PromotionsApi) -> Result<Self, CartError> {
        let catalog = api.list_promotions().await?;

        info!(promotions = catalog.len(), "promotion catalog loaded");

        Ok(Self::from_catalog(catalog))
    }

    /// Promotions over an already fetched catalog.
    pub fn from_catalog(catalog: Vec<Promotion>) -> Self {
        Self {
            catalog,
            applied: AppliedPromotion::none(),
        }
    }

    /// Apply `code`, replacing any promotion applied before.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Promotion`] when the code is not in the catalog.
    /// The previously applied promotion stays in place.
    pub fn apply(&mut self, code: &str) -> Result<&Promotion, CartError> {
        Ok(self.applied.apply(code, &self.catalog)?)
    }

    /// Clear the applied promotion.
    pub fn remove(&mut self) {
        self.applied.remove();
    }

    /// The applied promotion.
    pub fn applied(&self) -> Option<&Promotion> {
        self.applied.get()
    }

    /// Every promotion on offer.
    pub fn catalog(&self) -> &[Promotion] {
        &self.catalog
    }
}
