use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{StoreConfig, DEFAULT_ENTRY_EXTENSION};

use super::error::StorageError;
use super::KvStore;

/// File-based key/value store.
///
/// Each key lives in its own file so keys may contain any character:
/// ```text
/// <data_dir>/
///   <sha256(key)>.json     # {"key": "...", "value": "..."}
/// ```
pub struct FileKv {
    base_path: PathBuf,
}

/// On-disk envelope of one entry.
#[derive(Serialize, Deserialize)]
struct Entry {
    key: String,
    value: String,
}

impl FileKv {
    /// Creates a store rooted at `base_path`. The directory is created lazily
    /// on first write.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Creates a store rooted at the configured data directory.
    pub fn with_config(config: &StoreConfig) -> Self {
        Self::new(config.data_path())
    }

    /// Returns the root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path of the file holding `key`.
    fn entry_file(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let name = format!("{}.{}", hex::encode(hasher.finalize()), DEFAULT_ENTRY_EXTENSION);
        self.base_path.join(name)
    }

    /// Ensures the base directory exists.
    fn ensure_base_dir(&self) -> Result<(), StorageError> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path).map_err(|e| StorageError::io(&self.base_path, e))?;
        }
        Ok(())
    }

    fn read_entry(path: &Path) -> Result<Entry, StorageError> {
        let json = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
        serde_json::from_str(&json).map_err(|_| StorageError::CorruptEntry(path.to_path_buf()))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_file(key);
        if !path.exists() {
            return Ok(None);
        }

        let entry = Self::read_entry(&path)?;
        if entry.key != key {
            return Err(StorageError::CorruptEntry(path));
        }
        Ok(Some(entry.value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_base_dir()?;

        let path = self.entry_file(key);
        let entry = Entry {
            key: key.to_string(),
            value: value.to_string(),
        };
        let json = serde_json::to_string(&entry)?;
        fs::write(&path, json).map_err(|e| StorageError::io(&path, e))?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_file(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StorageError::io(&path, e))?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let entries = fs::read_dir(&self.base_path).map_err(|e| StorageError::io(&self.base_path, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.base_path, e))?;
            let path = entry.path();

            let is_entry = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == DEFAULT_ENTRY_EXTENSION)
                .unwrap_or(false);
            if path.is_file() && is_entry {
                match Self::read_entry(&path) {
                    Ok(entry) => keys.push(entry.key),
                    Err(_) => continue, // Skip unreadable entries
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
