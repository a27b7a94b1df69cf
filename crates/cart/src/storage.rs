//! Persistent storage for the cart's durable mirror.
//!
//! Storage is a key-value text store: the cart serializes to one JSON payload
//! under one fixed, namespaced key. The store overwrites the whole payload
//! after every successful mutation, so the backend only ever needs `load` and
//! `save`.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StorageError;

/// Durable key-value text storage surviving session restarts.
pub trait CartStorage {
    /// Load the payload stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the payload cannot be written durably.
    fn save(&mut self, key: &str, payload: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one JSON file per key under a data directory.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write never leaves a half-written payload behind.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Open (and create if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File path for `key`, with non-filename characters replaced.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn save(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(payload.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory storage for tests and throwaway sessions.
///
/// Clones share the same underlying map, so a handle kept outside the store
/// observes every payload the store saves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one payload.
    #[must_use]
    pub fn with_payload(key: &str, payload: &str) -> Self {
        let storage = Self::new();
        storage
            .lock()
            .insert(key.to_string(), payload.to_string());
        storage
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shoebox-storage-{label}-{}", std::process::id()))
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load("@shoebox:cart").unwrap(), None);

        storage.save("@shoebox:cart", "[]").unwrap();
        assert_eq!(storage.load("@shoebox:cart").unwrap().unwrap(), "[]");

        storage.save("@shoebox:cart", r#"[{"id":1}]"#).unwrap();
        assert_eq!(
            storage.load("@shoebox:cart").unwrap().unwrap(),
            r#"[{"id":1}]"#
        );
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = scratch_dir("roundtrip");
        let mut storage = JsonFileStorage::new(&dir).unwrap();

        assert_eq!(storage.load("@shoebox:cart").unwrap(), None);
        storage.save("@shoebox:cart", r#"[{"id":1,"quantity":2}]"#).unwrap();
        assert_eq!(
            storage.load("@shoebox:cart").unwrap().unwrap(),
            r#"[{"id":1,"quantity":2}]"#
        );

        // A fresh handle over the same directory sees the same payload.
        let storage = JsonFileStorage::new(&dir).unwrap();
        assert_eq!(
            storage.load("@shoebox:cart").unwrap().unwrap(),
            r#"[{"id":1,"quantity":2}]"#
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_key_maps_to_safe_filename() {
        let dir = scratch_dir("filename");
        let storage = JsonFileStorage::new(&dir).unwrap();
        let path = storage.path_for("@shoebox:cart");
        assert_eq!(path.file_name().unwrap(), "_shoebox_cart.json");
        fs::remove_dir_all(&dir).unwrap();
    }
}
