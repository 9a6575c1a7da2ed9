use std::collections::BTreeMap;

use super::error::StorageError;
use super::KvStore;

/// In-process key/value store.
///
/// An optional quota bounds the total bytes of keys plus values, which lets
/// callers exercise write-failure handling without a real medium.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryKv {
    /// Creates an empty, unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects writes beyond `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(limit),
        }
    }

    /// Total bytes of keys and values currently stored.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let replaced = self.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let used = self.used_bytes() - replaced + key.len() + value.len();
            if used > limit {
                return Err(StorageError::QuotaExceeded { used, limit });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_rejects_oversized_write() {
        let mut kv = MemoryKv::with_quota(10);
        kv.set("k", "12345").unwrap();
        let err = kv.set("k2", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 10, .. }));
        assert_eq!(kv.get("k2").unwrap(), None);
    }

    #[test]
    fn test_overwrite_within_quota_counts_replaced_value() {
        let mut kv = MemoryKv::with_quota(10);
        kv.set("k", "123456789").unwrap();
        kv.set("k", "987654321").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("987654321"));
    }
}
