//! Client-side authentication state.
//!
//! - [`TokenStore`] - persisted bearer token and its (unverified) claims
//! - [`UserStore`] - persisted profile of the logged-in user
//! - [`SessionKeyProvider`] - derives the active [`SessionKey`] on demand
//!
//! Nothing here caches the session: every call goes back to the store, so a
//! login or logout performed through one handle is visible to all others.

mod token;
mod user;

pub use token::{Claims, TokenError, TokenStore};
pub use user::UserStore;

use crate::models::SessionKey;

/// Source of the current session key.
///
/// The cart store asks for the key on every read and write instead of
/// remembering it, so switching users never leaves it pointed at a stale cart.
pub trait SessionKeyProvider: Send + Sync {
    /// The session that is active right now.
    fn session_key(&self) -> SessionKey;
}

/// A fixed session, mostly useful in tests.
impl SessionKeyProvider for SessionKey {
    fn session_key(&self) -> SessionKey {
        *self
    }
}

#[cfg(test)]
pub(crate) use token::tests::make_token;
#[cfg(test)]
pub(crate) use user::tests::profile as test_profile;
