//! The cart store.
//!
//! [`CartStore`] owns the authoritative in-memory cart and its persisted
//! mirror. Every operation snapshots the current cart, builds a new one, and
//! commits it by writing the mirror first and swapping memory second. A
//! failed write therefore leaves both copies untouched.
//!
//! Operations are not serialized against each other: two overlapping calls
//! each commit the cart they built, and the later commit wins.

use std::num::NonZeroU32;
use std::sync::Arc;

use rocket_cart_core::{Cart, Product, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::api::{CatalogClient, StockClient};
use crate::error::{CartError, FailureCause, Result, add_breadcrumb};
use crate::mirror::CartMirror;
use crate::storage::StorageError;

/// Request to set a product's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Cart state shared by all UI components.
///
/// Cheaply cloneable via `Arc`; clones operate on the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    catalog: Arc<dyn CatalogClient>,
    stock: Arc<dyn StockClient>,
    mirror: CartMirror,
    cart: watch::Sender<Cart>,
}

impl CartStore {
    /// Create a store, seeding it from the mirror if it holds a valid cart.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Product detail lookups
    /// * `stock` - Available quantity lookups
    /// * `mirror` - Persisted copy of the cart
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        stock: Arc<dyn StockClient>,
        mirror: CartMirror,
    ) -> Self {
        let initial = mirror.load().unwrap_or_default();
        let (cart, _) = watch::channel(initial);

        Self {
            inner: Arc::new(CartStoreInner {
                catalog,
                stock,
                mirror,
                cart,
            }),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.cart.borrow().clone()
    }

    /// Receiver notified after every commit.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.cart.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// Increments the quantity if the product is already in the cart,
    /// otherwise fetches it from the catalog and appends it with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StockExceeded` if the new quantity is above the
    /// available stock, and `CartError::AddFailed` if a lookup or the commit
    /// fails. The cart is unchanged in both cases.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<()> {
        let failed = |cause| CartError::AddFailed { product_id, cause };

        let current = self.cart();
        let existing = current.find(product_id);

        let stock = self
            .inner
            .stock
            .get_stock(product_id)
            .await
            .map_err(|e| failed(FailureCause::Stock(e)))?;

        let requested = existing.map_or(1, |p| i64::from(p.amount) + 1);
        let stock_exceeded = CartError::StockExceeded {
            product_id,
            requested,
            available: stock.amount,
        };
        if !stock.covers(requested) {
            return Err(stock_exceeded);
        }
        // Within stock; only fails once the line is already at u32::MAX.
        let Some(requested) = u32::try_from(requested).ok().and_then(NonZeroU32::new) else {
            return Err(stock_exceeded);
        };

        let next = match current.with_amount(product_id, requested) {
            Some(next) => next,
            None => {
                let record = self
                    .inner
                    .catalog
                    .get_product(product_id)
                    .await
                    .map_err(|e| failed(FailureCause::Catalog(e)))?;
                current
                    .with_appended(Product::from_catalog(record, 1))
                    .map_err(|e| failed(e.into()))?
            }
        };

        self.commit(next).map_err(|e| failed(e.into()))?;
        add_breadcrumb(
            "Added product",
            &[
                ("product_id", product_id.to_string()),
                ("amount", requested.to_string()),
            ],
        );
        Ok(())
    }

    /// Remove a product entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartError::RemoveFailed` if the product is not in the cart or
    /// the commit fails. The cart is unchanged in both cases.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) -> Result<()> {
        let failed = |cause| CartError::RemoveFailed { product_id, cause };

        let next = self
            .cart()
            .without(product_id)
            .ok_or_else(|| failed(FailureCause::NotInCart))?;

        self.commit(next).map_err(|e| failed(e.into()))?;
        add_breadcrumb("Removed product", &[("product_id", product_id.to_string())]);
        Ok(())
    }

    /// Set a product's quantity.
    ///
    /// A non-positive amount is ignored, as is a product that is not in the
    /// cart. Removal goes through [`remove_product`](Self::remove_product).
    ///
    /// # Errors
    ///
    /// Returns `CartError::StockExceeded` if `amount` is above the available
    /// stock, and `CartError::UpdateFailed` if the stock lookup or the commit
    /// fails. The cart is unchanged in both cases.
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) -> Result<()> {
        let UpdateProductAmount { product_id, amount } = request;
        let failed = |cause| CartError::UpdateFailed { product_id, cause };

        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(());
        }

        let stock = self
            .inner
            .stock
            .get_stock(product_id)
            .await
            .map_err(|e| failed(FailureCause::Stock(e)))?;

        let stock_exceeded = CartError::StockExceeded {
            product_id,
            requested: amount,
            available: stock.amount,
        };
        if !stock.covers(amount) {
            return Err(stock_exceeded);
        }
        // Positive and within stock; only fails if stock exceeds u32::MAX.
        let Some(amount) = u32::try_from(amount).ok().and_then(NonZeroU32::new) else {
            return Err(stock_exceeded);
        };

        let Some(next) = self.cart().with_amount(product_id, amount) else {
            debug!("Product not in cart, nothing to update");
            return Ok(());
        };

        self.commit(next).map_err(|e| failed(e.into()))?;
        add_breadcrumb(
            "Changed product quantity",
            &[
                ("product_id", product_id.to_string()),
                ("amount", amount.to_string()),
            ],
        );
        Ok(())
    }

    /// Persist `next`, then make it the current cart.
    ///
    /// The storage write is synchronous and blocks the calling task.
    fn commit(&self, next: Cart) -> std::result::Result<(), StorageError> {
        self.inner.mirror.save(&next)?;
        debug!(
            entries = next.len(),
            items = next.item_count(),
            "Committed cart"
        );
        self.inner.cart.send_replace(next);
        Ok(())
    }
}
