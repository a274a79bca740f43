//! HTTP implementation of the catalog and stock clients.
//!
//! Uses `reqwest` for HTTP and caches catalog records with `moka`.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use rocket_cart_core::{CatalogProduct, ProductId, Stock};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, CatalogClient, StockClient};
use crate::config::ApiConfig;

/// Client for the catalog and stock REST API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the catalog
/// cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog_cache: Cache<ProductId, CatalogProduct>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// No request timeout is set; transport defaults apply.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog_cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET `path` relative to the base URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogClient for ApiClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, ApiError> {
        if let Some(product) = self.inner.catalog_cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: CatalogProduct = self.get_json(&format!("products/{id}")).await?;

        self.inner.catalog_cache.insert(id, product.clone()).await;

        Ok(product)
    }
}

#[async_trait]
impl StockClient for ApiClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.get_json(&format!("stock/{id}")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use rocket_cart_core::Price;

    use super::*;

    async fn product(
        State(hits): State<Arc<AtomicUsize>>,
        Path(id): Path<i32>,
    ) -> axum::response::Response {
        hits.fetch_add(1, Ordering::SeqCst);
        match id {
            1 => Json(serde_json::json!({
                "id": 1,
                "title": "Tênis de Caminhada Leve Confortável",
                "price": 179.9,
                "image": "https://example.com/1.jpg"
            }))
            .into_response(),
            2 => "not json".into_response(),
            3 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn stock(Path(id): Path<i32>) -> axum::response::Response {
        if id == 1 {
            Json(serde_json::json!({ "id": 1, "amount": 3 })).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    async fn serve() -> (ApiClient, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/products/{id}", get(product))
            .route("/api/stock/{id}", get(stock))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = ApiConfig {
            base_url: Url::parse(&format!("http://{addr}/api/")).unwrap(),
            catalog_cache_ttl: Duration::from_secs(60),
        };
        (ApiClient::new(&config).unwrap(), hits)
    }

    #[tokio::test]
    async fn test_get_product() {
        let (client, _) = serve().await;
        let product = client.get_product(ProductId::new(1)).await.unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::from_cents(17_990));
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let (client, hits) = serve().await;
        client.get_product(ProductId::new(1)).await.unwrap();
        client.get_product(ProductId::new(1)).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_product_errors() {
        let (client, _) = serve().await;

        let err = client.get_product(ProductId::new(2)).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));

        let err = client.get_product(ProductId::new(3)).await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 500, .. }));

        let err = client.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_stock() {
        let (client, _) = serve().await;
        let stock = client.get_stock(ProductId::new(1)).await.unwrap();
        assert_eq!(stock.amount, 3);

        let err = client.get_stock(ProductId::new(5)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let config = ApiConfig::new("http://127.0.0.1:9").unwrap();
        let client = ApiClient::new(&config).unwrap();
        let err = client.get_stock(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}
