//! File-backed store.
//!
//! The whole store is a single JSON object (`{"key": "value", ...}`) kept in
//! memory and rewritten on every mutation. Writes go to a sibling temp file
//! that is then renamed over the original, so a crash mid-write leaves the
//! previous document intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// Key-value store persisted to a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file opens as an empty store; the file and its parent
    /// directories are created on the first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read, or
    /// `StorageError::CorruptFile` if it is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|source| StorageError::CorruptFile {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let document =
            serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
                key: self.path.display().to_string(),
                source,
            })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, document)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("shopapp-store-{}", uuid::Uuid::new_v4()))
            .join("storage.json")
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let path = temp_path();
        let store = FileStore::open(&path).unwrap();
        assert!(store.get("user").unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path();
        {
            let store = FileStore::open(&path).unwrap();
            store.set("access_token", "token-1").unwrap();
            store.set("cart:guest", "[[5,2]]").unwrap();
            store.remove("access_token").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("access_token").unwrap().is_none());
        assert_eq!(reopened.get("cart:guest").unwrap().as_deref(), Some("[[5,2]]"));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json at all").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StorageError::CorruptFile { .. })));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
