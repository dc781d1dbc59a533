//! Persisted profile of the logged-in user.

use serde::Deserialize;
use tracing::{debug, error, warn};

use shopapp_core::UserId;

use super::SessionKeyProvider;
use crate::models::{SessionKey, UserProfile};
use crate::storage::{SharedStore, StorageError, keys, read_json, write_json};

/// Minimal view of the stored profile used to derive the session key.
///
/// A profile that fails full validation still scopes the cart to its owner
/// as long as it carries a numeric id.
#[derive(Deserialize)]
struct StoredIdentity {
    #[serde(default)]
    id: Option<UserId>,
}

/// Store for the logged-in user's profile.
#[derive(Clone)]
pub struct UserStore {
    store: SharedStore,
}

impl UserStore {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Load and validate the stored profile.
    ///
    /// Returns `Ok(None)` when no profile is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Decode` when a profile is stored but does not
    /// have the expected shape, or another `StorageError` if the store fails.
    pub fn load(&self) -> Result<Option<UserProfile>, StorageError> {
        read_json(self.store.as_ref(), keys::USER)
    }

    /// The stored profile, or `None` if absent or invalid.
    ///
    /// Invalid profiles are logged and treated as logged out.
    #[must_use]
    pub fn current(&self) -> Option<UserProfile> {
        match self.load() {
            Ok(profile) => {
                debug!(found = profile.is_some(), "Loaded user profile from storage");
                profile
            }
            Err(e) => {
                error!(error = %e, "Error retrieving user profile from storage");
                None
            }
        }
    }

    /// Persist `profile` as the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if encoding or the write fails.
    pub fn save(&self, profile: &UserProfile) -> Result<(), StorageError> {
        write_json(self.store.as_ref(), keys::USER, profile)
    }

    /// Delete the stored profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub fn remove(&self) -> Result<(), StorageError> {
        self.store.remove(keys::USER)?;
        debug!("User profile removed from storage");
        Ok(())
    }
}

impl SessionKeyProvider for UserStore {
    fn session_key(&self) -> SessionKey {
        let raw = match self.store.get(keys::USER) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionKey::Guest,
            Err(e) => {
                error!(error = %e, "Failed to read user profile, using guest session");
                return SessionKey::Guest;
            }
        };

        match serde_json::from_str::<StoredIdentity>(&raw) {
            Ok(StoredIdentity { id: Some(id) }) => SessionKey::User(id),
            Ok(StoredIdentity { id: None }) => SessionKey::Guest,
            Err(e) => {
                warn!(error = %e, "Stored user profile is unreadable, using guest session");
                SessionKey::Guest
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use shopapp_core::RoleId;

    use super::*;
    use crate::models::Role;
    use crate::storage::{KeyValueStore, MemoryStore};

    pub(crate) fn profile(id: i32) -> UserProfile {
        UserProfile {
            id: UserId::new(id),
            fullname: format!("User {id}"),
            phone_number: format!("09000000{id:02}"),
            address: "Ha Noi".to_string(),
            is_active: true,
            date_of_birth: None,
            facebook_account_id: None,
            google_account_id: None,
            role: Role {
                id: RoleId::new(1),
                name: "user".to_string(),
            },
        }
    }

    fn setup() -> (Arc<MemoryStore>, UserStore) {
        let store = Arc::new(MemoryStore::new());
        let users = UserStore::new(store.clone());
        (store, users)
    }

    #[test]
    fn test_no_profile_is_guest() {
        let (_, users) = setup();
        assert!(users.current().is_none());
        assert_eq!(users.session_key(), SessionKey::Guest);
    }

    #[test]
    fn test_save_and_load_profile() {
        let (_, users) = setup();
        users.save(&profile(9)).unwrap();

        assert_eq!(users.current().unwrap(), profile(9));
        assert_eq!(users.session_key(), SessionKey::User(UserId::new(9)));

        users.remove().unwrap();
        assert!(users.current().is_none());
        assert_eq!(users.session_key(), SessionKey::Guest);
    }

    #[test]
    fn test_invalid_json_is_guest_and_none() {
        let (store, users) = setup();
        store.set(keys::USER, "{broken").unwrap();

        assert!(users.current().is_none());
        assert!(matches!(users.load(), Err(StorageError::Decode { .. })));
        assert_eq!(users.session_key(), SessionKey::Guest);
    }

    #[test]
    fn test_partial_profile_still_scopes_session() {
        let (store, users) = setup();
        store.set(keys::USER, r#"{"id": 4}"#).unwrap();

        assert!(users.current().is_none());
        assert_eq!(users.session_key(), SessionKey::User(UserId::new(4)));
    }

    #[test]
    fn test_profile_without_id_is_guest() {
        let (store, users) = setup();
        store.set(keys::USER, r#"{"fullname": "Nobody"}"#).unwrap();
        assert_eq!(users.session_key(), SessionKey::Guest);
    }
}
