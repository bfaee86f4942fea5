//! REST client for the storefront API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use checkout::{
    accounts::{AccountUuid, Profile},
    items::{LineItem, LineItemUuid},
    orders::{OrderConfirmation, OrderRequest},
    payments::PaymentMethod,
    promotions::Promotion,
};

use crate::remote::{
    AccountsApi, CartApi, OrdersApi, PaymentMethodsApi, PromotionsApi,
    errors::{PayloadError, RemoteError},
    payloads::{
        CartItemUpdate, CartPayload, LineItemPayload, OrderCreatedPayload, PaymentMethodPayload,
        ProfilePayload, PromotionPayload, error_message,
    },
};

/// Configuration for connecting to the storefront API.
#[derive(Debug, Clone)]
pub struct StorefrontEndpoint {
    /// Base URL without a trailing slash, e.g. `"https://api.example.com/v1"`.
    pub base_url: String,

    /// Bearer token sent with every request, when set.
    pub token: Option<String>,
}

/// HTTP client for every storefront collaborator.
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    config: StorefrontEndpoint,
    http: Client,
}

impl HttpStorefront {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: StorefrontEndpoint) -> Self {
        Self {
            config: StorefrontEndpoint {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token: config.token,
            },
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        debug!(status = status.as_u16(), "storefront request failed");

        Err(RemoteError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        Ok(self.send(request).await?.json().await?)
    }
}

#[async_trait]
impl CartApi for HttpStorefront {
    #[instrument(name = "storefront.get_cart", skip(self), fields(account = %account), err)]
    async fn get_cart(&self, account: AccountUuid) -> Result<Vec<LineItem>, RemoteError> {
        let request = self.http.get(self.url(&format!("/accounts/{account}/cart")));
        let payload: CartPayload = self.fetch(request).await?;

        Ok(Vec::<LineItem>::try_from(payload)?)
    }

    #[instrument(
        name = "storefront.update_item",
        skip(self, update),
        fields(item = %item, quantity = update.quantity),
        err
    )]
    async fn update_item(
        &self,
        item: LineItemUuid,
        update: CartItemUpdate,
    ) -> Result<LineItem, RemoteError> {
        let request = self
            .http
            .put(self.url(&format!("/cart-items/{item}")))
            .json(&update);

        let payload: LineItemPayload = self.fetch(request).await?;

        Ok(LineItem::try_from(payload)?)
    }

    #[instrument(name = "storefront.remove_item", skip(self), fields(item = %item), err)]
    async fn remove_item(&self, item: LineItemUuid) -> Result<(), RemoteError> {
        let request = self.http.delete(self.url(&format!("/cart-items/{item}")));

        self.send(request).await?;

        Ok(())
    }
}

#[async_trait]
impl PromotionsApi for HttpStorefront {
    #[instrument(name = "storefront.list_promotions", skip(self), err)]
    async fn list_promotions(&self) -> Result<Vec<Promotion>, RemoteError> {
        let payloads: Vec<PromotionPayload> =
            self.fetch(self.http.get(self.url("/promotions"))).await?;

        let promotions = payloads
            .into_iter()
            .map(Promotion::try_from)
            .collect::<Result<Vec<_>, PayloadError>>()?;

        Ok(promotions)
    }
}

#[async_trait]
impl PaymentMethodsApi for HttpStorefront {
    #[instrument(name = "storefront.list_payment_methods", skip(self), err)]
    async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, RemoteError> {
        let payloads: Vec<PaymentMethodPayload> = self
            .fetch(self.http.get(self.url("/payment-methods")))
            .await?;

        let methods = payloads
            .into_iter()
            .map(PaymentMethod::try_from)
            .collect::<Result<Vec<_>, PayloadError>>()?;

        Ok(methods)
    }
}

#[async_trait]
impl OrdersApi for HttpStorefront {
    #[instrument(
        name = "storefront.create_order",
        skip(self, order),
        fields(total = order.total, items = order.items.len()),
        err
    )]
    async fn create_order(&self, order: OrderRequest) -> Result<OrderConfirmation, RemoteError> {
        let request = self.http.post(self.url("/orders")).json(&order);
        let payload: OrderCreatedPayload = self.fetch(request).await?;

        Ok(payload.into())
    }
}

#[async_trait]
impl AccountsApi for HttpStorefront {
    #[instrument(name = "storefront.get_profile", skip(self), fields(account = %account), err)]
    async fn get_profile(&self, account: AccountUuid) -> Result<Profile, RemoteError> {
        let request = self.http.get(self.url(&format!("/accounts/{account}")));
        let payload: ProfilePayload = self.fetch(request).await?;

        Ok(Profile::try_from(payload)?)
    }
}
