//! String-keyed, string-valued storage
//!
//! The browser build persists to `window.localStorage`; native builds and
//! tests use [`MemoryStore`]. Everything above this layer only sees the
//! [`KeyValueStore`] trait.

use std::collections::BTreeMap;

use thiserror::Error;

/// Storage key space shared with the original front-end
pub mod keys {
    /// Catalog colour theme (`"light"` / `"dark"`)
    pub const THEME: &str = "theme";
    /// Catalog announcement banner dismissed (`"true"`)
    pub const ANNOUNCEMENT_CLOSED: &str = "announcement_closed";
    /// Best reaction time in ms, `"0"` or missing when unset
    pub const BEST_REACTION_TIME: &str = "bestReactionTime";
    /// Fewest attempts needed to clear a memory round
    pub const MEMORY_BEST_SCORE: &str = "memoryBestScore";
    /// Achievement ledger (JSON)
    pub const ACHIEVEMENTS: &str = "achievements";
    /// Cumulative counters (JSON)
    pub const STATS: &str = "cyberspaceStats";
    /// User preferences (JSON)
    pub const SETTINGS: &str = "cyberspaceSettings";

    /// Every key this crate writes
    pub const ALL: &[&str] = &[
        THEME,
        ANNOUNCEMENT_CLOSED,
        BEST_REACTION_TIME,
        MEMORY_BEST_SCORE,
        ACHIEVEMENTS,
        STATS,
        SETTINGS,
    ];
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage operation on `{key}` failed: {reason}")]
    Backend { key: String, reason: String },
}

/// Minimal key/value store interface
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Remove every key in `keys`, continuing past individual failures.
    /// Returns the first error encountered, if any.
    fn remove_all(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in keys {
            if let Err(e) = self.remove(key) {
                log::warn!("Failed to remove `{}`: {}", key, e);
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// `window.localStorage` (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    /// Open the window's LocalStorage (fails in private mode on some browsers)
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }

    fn backend_err(key: &str, err: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Backend {
            key: key.to_string(),
            reason: format!("{:?}", err),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| Self::backend_err(key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| Self::backend_err(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| Self::backend_err(key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(keys::THEME).unwrap(), None);

        store.set(keys::THEME, "dark").unwrap();
        assert_eq!(store.get(keys::THEME).unwrap().as_deref(), Some("dark"));

        store.remove(keys::THEME).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_all_leaves_foreign_keys() {
        let mut store = MemoryStore::new();
        for key in keys::ALL {
            store.set(key, "x").unwrap();
        }
        store.set("unrelated", "keep").unwrap();

        store.remove_all(keys::ALL).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains_key("unrelated"));
    }
}
