//! Session key that scopes per-user client storage.

use core::fmt;

use shopapp_core::UserId;

use crate::storage::keys;

/// Identifies whose data is active in the client.
///
/// Derived from the stored user profile; falls back to [`SessionKey::Guest`]
/// when nobody is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// A logged-in user.
    User(UserId),
    /// No stored profile.
    Guest,
}

impl SessionKey {
    /// Sentinel used in storage keys for anonymous sessions.
    pub const GUEST: &'static str = "guest";

    /// Storage key of the cart belonging to this session.
    #[must_use]
    pub fn cart_key(&self) -> String {
        format!("{}{self}", keys::CART_PREFIX)
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "{id}"),
            Self::Guest => f.write_str(Self::GUEST),
        }
    }
}
