//! Durable key-value storage used by the cart and the mock login.
//!
//! The store holds plain text values under fixed keys, the same shape as a
//! browser's local storage. Implementations must be usable through a shared
//! reference so the cart store and the auth service can hold the same handle.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

/// Key holding the serialized cart line items.
pub const CART_KEY: &str = "cart_v1";

/// Key holding the serialized logged-in demo user.
pub const USER_KEY: &str = "demo_user";

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store cannot currently be used (e.g. a poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The key cannot be used by this store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A synchronous text key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Nothing survives the process, which makes it the
/// natural choice for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(CART_KEY).unwrap(), None);

        store.set(CART_KEY, "[]").unwrap();
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some("[]"));

        store.set(CART_KEY, "[1]").unwrap();
        assert_eq!(store.get(CART_KEY).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_store_remove_absent_is_ok() {
        let store = MemoryStore::new();
        store.remove(USER_KEY).unwrap();

        store.set(USER_KEY, "{}").unwrap();
        store.remove(USER_KEY).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }
}
