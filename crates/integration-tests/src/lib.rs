//! Integration tests for Rocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocket-cart-integration-tests
//! ```
//!
//! # Test Context
//!
//! [`TestContext`] starts an HTTP fixture on an ephemeral local port that
//! serves `/products/{id}` and `/stock/{id}` from in-memory tables, and a
//! temporary directory for the on-disk cart file. Each call to
//! [`TestContext::store`] opens a fresh [`CartStore`] against the same file,
//! the way a new session would.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocket_cart_core::{Cart, CatalogProduct, Price, ProductId, Stock};
use rocket_cart_store::{ApiClient, ApiConfig, CartMirror, CartStore, FileStore, KeyValueStore};
use tempfile::TempDir;

/// Storage slot used by every test store.
pub const CART_KEY: &str = "@RocketShoes:cart";

#[derive(Default)]
struct Fixture {
    products: RwLock<HashMap<ProductId, CatalogProduct>>,
    stock: RwLock<HashMap<ProductId, i64>>,
    outage: RwLock<bool>,
    product_requests: AtomicUsize,
    stock_requests: AtomicUsize,
}

/// A running fixture API plus a scratch directory for persisted state.
pub struct TestContext {
    fixture: Arc<Fixture>,
    addr: SocketAddr,
    dir: TempDir,
}

impl TestContext {
    /// Start the fixture API seeded with the default catalog.
    ///
    /// # Panics
    ///
    /// Panics if the listener or temp directory cannot be created.
    pub async fn new() -> Self {
        let fixture = Arc::new(Fixture::default());
        for (id, title, cents, stock) in [
            (1, "Tênis de Caminhada Leve Confortável", 17_990, 3),
            (2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 13_990, 5),
            (3, "Tênis Adidas Duramo Lite 2.0", 21_990, 2),
            (4, "Tênis de Caminhada Soft Masculino", 23_990, 1),
            (5, "Tênis VR Caminhada Confortável Masculino", 13_990, 0),
        ] {
            let id = ProductId::new(id);
            fixture.products.write().unwrap_or_else(PoisonError::into_inner).insert(
                id,
                CatalogProduct {
                    id,
                    title: title.to_string(),
                    price: Price::from_cents(cents),
                    image: format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
                },
            );
            fixture
                .stock
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, stock);
        }

        let app = Router::new()
            .route("/products/{id}", get(get_product))
            .route("/stock/{id}", get(get_stock))
            .with_state(fixture.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture listener");
        let addr = listener.local_addr().expect("fixture address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            fixture,
            addr,
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Base URL of the fixture API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Path of the on-disk storage file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    /// Open a store the way a new session would.
    ///
    /// # Panics
    ///
    /// Panics if the API client cannot be built.
    #[must_use]
    pub fn store(&self) -> CartStore {
        let config = ApiConfig::new(&self.base_url()).expect("fixture URL");
        let api = Arc::new(ApiClient::new(&config).expect("API client"));
        let storage = Arc::new(FileStore::new(self.storage_path()));
        CartStore::new(api.clone(), api, CartMirror::new(storage, CART_KEY))
    }

    /// Decode the persisted cart straight from disk.
    ///
    /// # Panics
    ///
    /// Panics if the storage file or the slot cannot be read or decoded.
    #[must_use]
    pub fn persisted_cart(&self) -> Option<Cart> {
        FileStore::new(self.storage_path())
            .get(CART_KEY)
            .expect("read storage")
            .map(|raw| serde_json::from_str(&raw).expect("decode persisted cart"))
    }

    /// Write a raw value into the cart slot.
    ///
    /// # Panics
    ///
    /// Panics if the storage file cannot be written.
    pub fn write_raw_cart(&self, raw: &str) {
        FileStore::new(self.storage_path())
            .set(CART_KEY, raw)
            .expect("write storage");
    }

    /// Change the available stock for a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.fixture
            .stock
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ProductId::new(id), amount);
    }

    /// Make every API call fail with 503 until turned off.
    pub fn set_outage(&self, down: bool) {
        *self.fixture.outage.write().unwrap_or_else(PoisonError::into_inner) = down;
    }

    /// Number of `/products/{id}` requests served so far.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.fixture.product_requests.load(Ordering::SeqCst)
    }

    /// Number of `/stock/{id}` requests served so far.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.fixture.stock_requests.load(Ordering::SeqCst)
    }
}

fn is_down(fixture: &Fixture) -> bool {
    *fixture.outage.read().unwrap_or_else(PoisonError::into_inner)
}

async fn get_product(State(fixture): State<Arc<Fixture>>, Path(id): Path<i32>) -> Response {
    fixture.product_requests.fetch_add(1, Ordering::SeqCst);
    if is_down(&fixture) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let product = fixture
        .products
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&ProductId::new(id))
        .cloned();
    product.map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |p| Json(p).into_response(),
    )
}

async fn get_stock(State(fixture): State<Arc<Fixture>>, Path(id): Path<i32>) -> Response {
    fixture.stock_requests.fetch_add(1, Ordering::SeqCst);
    if is_down(&fixture) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let id = ProductId::new(id);
    let amount = fixture
        .stock
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    amount.map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |amount| Json(Stock { id, amount }).into_response(),
    )
}
