//! Persisted copy of the cart in a single key-value slot.

use std::sync::Arc;

use rocket_cart_core::Cart;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Binds one named slot of a [`KeyValueStore`] to the cart.
///
/// The slot holds the whole cart as a JSON array and is overwritten
/// wholesale on every save. There is no schema version.
#[derive(Debug, Clone)]
pub struct CartMirror {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl CartMirror {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Slot name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted cart.
    ///
    /// Returns `None` when the slot is empty, unreadable, or holds something
    /// that does not decode to a valid cart.
    #[must_use]
    pub fn load(&self) -> Option<Cart> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted cart");
                return None;
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                debug!(key = %self.key, entries = cart.len(), "Loaded persisted cart");
                Some(cart)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unparseable persisted cart");
                None
            }
        }
    }

    /// Overwrite the slot with `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded or the slot cannot be
    /// written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.storage.set(&self.key, &json)
    }
}
