//! Storefront API Config

use clap::Args;

use crate::remote::StorefrontEndpoint;

/// Storefront API connection settings.
#[derive(Debug, Clone, Args)]
pub struct StorefrontConfig {
    /// Storefront API base URL
    #[arg(long, env = "STOREFRONT_API_URL")]
    pub storefront_api_url: String,

    /// Bearer token for the storefront API
    #[arg(long, env = "STOREFRONT_API_TOKEN", hide_env_values = true)]
    pub storefront_api_token: Option<String>,
}

impl StorefrontConfig {
    /// Endpoint for the HTTP client.
    pub fn endpoint(&self) -> StorefrontEndpoint {
        StorefrontEndpoint {
            base_url: self.storefront_api_url.clone(),
            token: self.storefront_api_token.clone(),
        }
    }
}
