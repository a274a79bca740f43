//! Rocket Cart Store - shopping cart state for a storefront UI.
//!
//! # Architecture
//!
//! - [`CartStore`] holds the cart in memory and mirrors it to a key-value
//!   slot after every successful change
//! - Catalog and stock lookups go through the [`api::CatalogClient`] and
//!   [`api::StockClient`] traits, injected at construction
//! - Failed operations return a [`CartError`]; the UI layer renders its
//!   [`Notice`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rocket_cart_store::{ApiClient, CartConfig, CartMirror, CartStore, FileStore};
//!
//! let config = CartConfig::from_env()?;
//! let api = Arc::new(ApiClient::new(&config.api)?);
//! let storage = Arc::new(FileStore::new(&config.storage.path));
//! let store = CartStore::new(
//!     api.clone(),
//!     api,
//!     CartMirror::new(storage, config.storage.cart_key.clone()),
//! );
//!
//! if let Err(e) = store.add_product(ProductId::new(1)).await {
//!     e.report();
//!     show_toast(e.notice().message());
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod mirror;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError, CatalogClient, StockClient};
pub use config::{ApiConfig, CartConfig, ConfigError, StorageConfig};
pub use error::{CartError, FailureCause, Notice};
pub use mirror::CartMirror;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, UpdateProductAmount};
