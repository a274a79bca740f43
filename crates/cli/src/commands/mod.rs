//! Cart commands.
//!
//! Each command runs at most one store operation, then prints the cart.
//!
//! # Environment Variables
//!
//! See `rocket_cart_store::config` for the full list; the CLI reads
//! `CART_API_URL`, `CART_STORAGE_PATH`, `CART_STORAGE_KEY`, and
//! `CART_CURRENCY`.

use std::sync::Arc;

use rocket_cart_core::{CurrencyCode, ProductId};
use rocket_cart_store::{
    ApiClient, ApiError, CartConfig, CartError, CartMirror, CartStore, FileStore,
    UpdateProductAmount,
};
use thiserror::Error;

use crate::render;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The cart operation was rejected or failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The API client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// The cart could not be encoded for output.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// A parsed cart command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Show { json: bool },
    Add(ProductId),
    Remove(ProductId),
    Update { product_id: ProductId, amount: i64 },
}

/// Build a store from configuration.
///
/// # Errors
///
/// Returns error if the HTTP client fails to build.
pub fn open_store(config: &CartConfig) -> Result<CartStore, CliError> {
    let api = Arc::new(ApiClient::new(&config.api)?);
    let storage = Arc::new(FileStore::new(&config.storage.path));
    let mirror = CartMirror::new(storage.clone(), config.storage.cart_key.clone());

    tracing::debug!(
        api = %api.base_url(),
        storage = %storage.path().display(),
        key = mirror.key(),
        "Opening cart"
    );

    Ok(CartStore::new(api.clone(), api, mirror))
}

/// Result of running one command against a store.
#[derive(Debug)]
pub struct Completed {
    /// Rendered cart, printed whether or not the operation succeeded.
    pub output: String,
    /// Outcome of the store operation.
    pub outcome: Result<(), CartError>,
}

/// Run `command` against `store` and render the resulting cart.
///
/// # Errors
///
/// Returns error if the cart cannot be encoded as JSON.
pub async fn execute(
    store: &CartStore,
    command: CartCommand,
    currency: CurrencyCode,
) -> Result<Completed, CliError> {
    let (outcome, json) = match command {
        CartCommand::Show { json } => (Ok(()), json),
        CartCommand::Add(product_id) => (store.add_product(product_id).await, false),
        CartCommand::Remove(product_id) => (store.remove_product(product_id), false),
        CartCommand::Update { product_id, amount } => (
            store
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await,
            false,
        ),
    };

    let cart = store.cart();
    let output = if json {
        serde_json::to_string_pretty(&cart)?
    } else {
        render::cart_table(&cart, currency)
    };

    Ok(Completed { output, outcome })
}

/// Run `command` and print the resulting cart.
///
/// The cart is printed even when the operation fails, so the user sees the
/// unchanged state next to the notice.
///
/// # Errors
///
/// Returns `CliError::Cart` if the operation was rejected or failed.
pub async fn run(config: &CartConfig, command: CartCommand) -> Result<(), CliError> {
    let store = open_store(config)?;
    let Completed { output, outcome } = execute(&store, command, config.currency).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    outcome.map_err(CliError::from)
}
