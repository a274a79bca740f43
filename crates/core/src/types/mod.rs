//! Core types for Rocket Cart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartInvariantError};
pub use id::*;
pub use price::{CurrencyCode, Price, UnknownCurrency};
pub use product::{CatalogProduct, Product, Stock};
