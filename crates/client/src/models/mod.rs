//! Domain models held in client-side session state.
//!
//! - [`user`] - The logged-in user's profile as returned by the API
//! - [`session`] - Session key that scopes per-user storage

pub mod session;
pub mod user;

pub use session::SessionKey;
pub use user::{Role, UserProfile};
