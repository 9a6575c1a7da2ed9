//! Key/value storage backends.
//!
//! The engine never touches a storage medium directly; it reads and writes
//! JSON text under namespaced string keys through [`KvStore`].

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileKv;
pub use memory::MemoryKv;

/// Trait for key/value storage backends.
///
/// Implementations only move strings around; corruption handling and
/// error swallowing happen in [`crate::store`].
pub trait KvStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Lists every stored key in ascending order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
