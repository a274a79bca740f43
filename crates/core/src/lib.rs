//! Rocket Cart Core - Shared cart and catalog types.
//!
//! This crate provides the types shared by all Rocket Cart components:
//! - `store` - Cart store, collaborator clients, and persistence
//! - `cli` - Command-line UI for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. Every cart change is expressed as a function from one [`Cart`] to
//! a new one, so the store can commit whole carts atomically.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, catalog records, stock, and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
