//! Key-value persistence for client-side state.
//!
//! Everything the storefront remembers between runs (access token, user
//! profile, carts, last viewed catalog page) lives behind [`KeyValueStore`].
//! Values are plain strings; structured values are stored as JSON via
//! [`read_json`] and [`write_json`].
//!
//! # Stores
//!
//! - [`MemoryStore`] - process-local map, used in tests and ephemeral sessions
//! - [`FileStore`] - JSON document on disk, survives restarts

mod file;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be parsed.
    #[error("storage file {path} is corrupt: {source}")]
    CorruptFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is not valid JSON for the requested type.
    #[error("stored value for '{key}' is invalid: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized for storage.
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string key-value store.
///
/// Implementations must be safe to share between threads; every operation
/// takes effect immediately (there is no transaction or batching layer).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to the process-wide store.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and deserialize a JSON value.
///
/// Returns `Ok(None)` when the key is absent, and `StorageError::Decode` when
/// a value is present but does not match `T`.
///
/// # Errors
///
/// Returns `StorageError` if the store fails or the value is malformed.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Serialize and store a JSON value.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Well-known storage keys.
pub mod keys {
    /// Bearer token returned by the login endpoint.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// JSON-encoded profile of the logged-in user.
    pub const USER: &str = "user";

    /// Prefix for per-session carts (`cart:<user id>` or `cart:guest`).
    pub const CART_PREFIX: &str = "cart:";

    /// Last catalog page the user viewed.
    pub const CURRENT_PRODUCT_PAGE: &str = "currentProductPage";
}
