//! Persistent cart store
//!
//! Two layers:
//! - `StorageBackend`: a durable string slot per key (browser local storage,
//!   a directory of files, process memory)
//! - `CartStore`: the cart encoded as a JSON array under one fixed key
//!
//! Loading never fails. A slot that is missing, unreadable, not JSON, or not a
//! valid line item list yields an empty cart. Tabs or processes sharing a slot
//! are not coordinated: the last writer wins.

use crate::error::StoreError;
use crate::line_item::Cart;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Durable key/value slot
pub trait StorageBackend: Send + Sync {
    /// Read the raw value under `key`
    ///
    /// # Errors
    /// Backend-specific read failure
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the raw value under `key`
    ///
    /// # Errors
    /// Backend-specific write failure
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value under `key`
    ///
    /// # Errors
    /// Backend-specific write failure
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

/// One file per key inside a directory
///
/// Writes go to a sibling temp file and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (and create if needed) the backing directory
    ///
    /// # Errors
    /// - `StoreError::Io` if the directory cannot be created
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io_error(&dir, e))?;
        Ok(Self { dir })
    }

    /// Backing directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| StoreError::io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| StoreError::io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }
}

/// Whole-cart persistence
pub trait CartStore: Send + Sync {
    /// Read the cart; anything unusable reads as empty
    fn load(&self) -> Cart;

    /// Replace the persisted cart
    ///
    /// # Errors
    /// - `StoreError` if the backend rejects the write
    fn save(&self, cart: &Cart) -> Result<(), StoreError>;
}

/// Cart encoded as a JSON array under a single key
#[derive(Debug, Clone)]
pub struct JsonCartStore<B> {
    backend: B,
    key: String,
}

impl<B: StorageBackend> JsonCartStore<B> {
    /// Create store over `backend` using slot `key`
    #[inline]
    #[must_use]
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Slot key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: StorageBackend> CartStore for JsonCartStore<B> {
    fn load(&self) -> Cart {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "cart slot unreadable, using empty cart");
                return Cart::new();
            }
        };

        // `null` is what a cleared browser slot can hold
        if raw.trim() == "null" {
            return Cart::new();
        }

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "malformed cart data, using empty cart");
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let raw = serde_json::to_string(cart)?;
        self.backend.set(&self.key, &raw)
    }
}

impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    fn load(&self) -> Cart {
        (**self).load()
    }

    fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        (**self).save(cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn store_with(raw: &str) -> JsonCartStore<MemoryBackend> {
        let backend = MemoryBackend::new();
        backend.set("cart", raw).unwrap();
        JsonCartStore::new(backend, "cart")
    }

    #[test]
    fn absent_slot_is_empty() {
        let store = JsonCartStore::new(MemoryBackend::new(), "cart");
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_slots_are_empty() {
        for raw in [
            "not json",
            "{\"name\":\"A\"}",
            "[{\"name\":\"A\"}]",
            "[{\"name\":\"A\",\"price\":1,\"quantity\":-1}]",
            "[{\"name\":\"A\",\"price\":1,\"quantity\":0}]",
            "[{\"name\":\"A\",\"price\":1,\"quantity\":1},{\"name\":\"A\",\"price\":1,\"quantity\":1}]",
            "null",
            "",
        ] {
            assert!(store_with(raw).load().is_empty(), "expected empty for {raw:?}");
        }
    }

    #[test]
    fn save_then_load_roundtrip() {
        let store = JsonCartStore::new(MemoryBackend::new(), "cart");
        let mut cart = Cart::new();
        cart.add("B", Decimal::new(200, 2), Some(2));
        cart.add("A", Decimal::new(100, 2), None);
        store.save(&cart).unwrap();

        assert_eq!(store.load(), cart);
    }

    #[test]
    fn file_backend_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(matches!(
            backend.set("../escape", "[]"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn file_backend_get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get("cart").unwrap(), None);
        backend.remove("cart").unwrap();
    }
}
