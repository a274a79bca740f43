//! Catalog and stock collaborators.
//!
//! # Architecture
//!
//! - The cart store only sees the [`CatalogClient`] and [`StockClient`] traits,
//!   injected at construction time
//! - [`ApiClient`] implements both over HTTP with `reqwest`
//! - Catalog records are cached in memory via `moka`; stock is never cached
//!
//! # Endpoints
//!
//! - `GET {base}/products/{id}` - product record (`id`, `title`, `price`, `image`)
//! - `GET {base}/stock/{id}` - stock record (`id`, `amount`)
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_cart_store::api::{ApiClient, StockClient};
//!
//! let client = ApiClient::new(&config.api)?;
//! let stock = client.get_stock(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use rocket_cart_core::{CatalogProduct, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog or stock API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Source of product details.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the catalog record for a product.
    async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, ApiError>;
}

/// Source of remote-authoritative stock levels.
#[async_trait]
pub trait StockClient: Send + Sync {
    /// Fetch the available quantity for a product.
    async fn get_stock(&self, id: ProductId) -> Result<Stock, ApiError>;
}
