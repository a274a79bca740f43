//! Cart operation errors with Sentry integration.
//!
//! Every cart operation returns `Result<(), CartError>`. The UI layer decides
//! how to show the failure; [`CartError::notice`] gives it the message class
//! and [`CartError::report`] sends collaborator failures to Sentry before
//! logging them.

use rocket_cart_core::ProductId;
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Why a cart operation failed.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity is more than the stock service has available.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Adding a product failed.
    #[error("Failed to add product {product_id}: {cause}")]
    AddFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    /// Removing a product failed.
    #[error("Failed to remove product {product_id}: {cause}")]
    RemoveFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },

    /// Changing a product's quantity failed.
    #[error("Failed to change quantity of product {product_id}: {cause}")]
    UpdateFailed {
        product_id: ProductId,
        #[source]
        cause: FailureCause,
    },
}

/// Underlying reason for a failed add, remove, or update.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The product is not in the cart.
    #[error("product is not in the cart")]
    NotInCart,

    /// The stock lookup failed.
    #[error("stock lookup failed: {0}")]
    Stock(#[source] ApiError),

    /// The catalog lookup failed.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[source] ApiError),

    /// The new cart could not be persisted.
    #[error("could not persist cart: {0}")]
    Storage(#[from] StorageError),

    /// The new cart would have broken an invariant.
    #[error("cart invariant violated: {0}")]
    Invariant(#[from] rocket_cart_core::CartInvariantError),
}

/// User-facing message class for a failed cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    StockExceeded,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl Notice {
    /// Message shown to the shopper.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::StockExceeded => "Requested quantity is out of stock",
            Self::AddFailed => "Could not add the product to the cart",
            Self::RemoveFailed => "Could not remove the product from the cart",
            Self::UpdateFailed => "Could not change the product quantity",
        }
    }
}

impl CartError {
    /// Which message class the UI should show.
    #[must_use]
    pub const fn notice(&self) -> Notice {
        match self {
            Self::StockExceeded { .. } => Notice::StockExceeded,
            Self::AddFailed { .. } => Notice::AddFailed,
            Self::RemoveFailed { .. } => Notice::RemoveFailed,
            Self::UpdateFailed { .. } => Notice::UpdateFailed,
        }
    }

    /// Product the failed operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::StockExceeded { product_id, .. }
            | Self::AddFailed { product_id, .. }
            | Self::RemoveFailed { product_id, .. }
            | Self::UpdateFailed { product_id, .. } => *product_id,
        }
    }

    /// Underlying cause, if the error is not a stock violation.
    #[must_use]
    pub const fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::StockExceeded { .. } => None,
            Self::AddFailed { cause, .. }
            | Self::RemoveFailed { cause, .. }
            | Self::UpdateFailed { cause, .. } => Some(cause),
        }
    }

    /// Whether this failure came from a collaborator or storage rather than
    /// from the shopper's request.
    #[must_use]
    pub const fn is_system_failure(&self) -> bool {
        !matches!(self.cause(), None | Some(FailureCause::NotInCart))
    }

    /// Log the error, capturing system failures to Sentry first.
    pub fn report(&self) {
        if self.is_system_failure() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                product_id = %self.product_id(),
                sentry_event_id = %event_id,
                "Cart operation failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                product_id = %self.product_id(),
                "Cart operation rejected"
            );
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for a cart action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
pub fn add_breadcrumb(message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}
