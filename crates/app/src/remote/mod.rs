//! Remote Collaborators
//!
//! Cart persistence, promotion and payment catalogs, order creation and
//! account profiles all live behind these traits. [`HttpStorefront`]
//! implements every one of them against the storefront REST API.

use async_trait::async_trait;
use mockall::automock;

use checkout::{
    accounts::{AccountUuid, Profile},
    items::{LineItem, LineItemUuid},
    orders::{OrderConfirmation, OrderRequest},
    payments::PaymentMethod,
    promotions::Promotion,
};

pub use errors::{PayloadError, RemoteError};
pub use http::{HttpStorefront, StorefrontEndpoint};
pub use payloads::CartItemUpdate;

pub mod errors;
mod http;
pub mod payloads;

/// Server-side cart persistence.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Load the account's cart.
    async fn get_cart(&self, account: AccountUuid) -> Result<Vec<LineItem>, RemoteError>;

    /// Change a line's quantity, returning the line as now stored.
    async fn update_item(
        &self,
        item: LineItemUuid,
        update: CartItemUpdate,
    ) -> Result<LineItem, RemoteError>;

    /// Delete a line from the cart.
    async fn remove_item(&self, item: LineItemUuid) -> Result<(), RemoteError>;
}

/// Promotion catalog.
#[automock]
#[async_trait]
pub trait PromotionsApi: Send + Sync {
    /// Every promotion currently offered.
    async fn list_promotions(&self) -> Result<Vec<Promotion>, RemoteError>;
}

/// Payment method catalog.
#[automock]
#[async_trait]
pub trait PaymentMethodsApi: Send + Sync {
    /// Every payment method currently offered.
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, RemoteError>;
}

/// Order creation.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Create an order, returning its confirmation.
    async fn create_order(&self, order: OrderRequest) -> Result<OrderConfirmation, RemoteError>;
}

/// Account profiles.
#[automock]
#[async_trait]
pub trait AccountsApi: Send + Sync {
    /// Fetch the account's profile and address book.
    async fn get_profile(&self, account: AccountUuid) -> Result<Profile, RemoteError>;
}
