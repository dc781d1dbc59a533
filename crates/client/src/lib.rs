//! Shopapp storefront client library.
//!
//! Client-side state and REST plumbing for the Shopapp shop: the per-session
//! cart, the bearer token and user profile, request header construction and
//! one method per backend endpoint. Front ends (the `shopapp` CLI, or any
//! other) build a [`Storefront`] and drive it.
//!
//! # Architecture
//!
//! - [`storage`] - key-value persistence standing in for browser local storage
//! - [`session`] - token and user profile stores, session key derivation
//! - [`cart`] - cart scoped to the current session key
//! - [`http`] - header construction and failure mapping
//! - [`api`] - REST client with a `moka` cache for catalog reads
//! - [`services`] - login, registration and logout workflows
//! - [`views`] - paging, gallery, quantity and menu state for front ends

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod views;

pub use config::ClientConfig;
pub use error::ClientError;
pub use state::Storefront;
