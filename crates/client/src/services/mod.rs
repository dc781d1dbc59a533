//! Workflows that span the API and local session state.
//!
//! # Services
//!
//! - `auth` - Login, registration, logout and profile updates
pub mod auth;
