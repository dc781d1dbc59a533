//! Shopapp Core - Shared types library.
//!
//! This crate provides common types used across all Shopapp components:
//! - `client` - Storefront client library (storage, session, cart, REST API)
//! - `cli` - Command-line front end for the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
