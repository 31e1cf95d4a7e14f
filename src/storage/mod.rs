//! Persistence layer.
//!
//! A small key-value store of JSON values, saved as a single pretty-printed
//! JSON file. It plays the role browser local storage plays for the web
//! front-end: submitted requests survive a restart, nothing more.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default store file path.
pub const DEFAULT_STORE_FILE: &str = "hub_store.json";

/// Key holding submitted workflow modification requests.
pub const MODIFICATION_REQUESTS_KEY: &str = "modificationRequests";
/// Key holding submitted custom workflow requests.
pub const CUSTOM_REQUESTS_KEY: &str = "customRequests";

#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Value>,
}

impl LocalStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store file. A missing file yields an empty store that will
    /// be created on the first `save`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No store file found, starting empty");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                entries: BTreeMap::new(),
            });
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read store from {}", path.display()))?;
        let entries: BTreeMap<String, Value> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse store from {}", path.display()))?;

        info!(path = %path.display(), keys = entries.len(), "Store loaded from disk");
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    /// Write the store back to its file. No-op for in-memory stores.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialise store")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write store to {}", path.display()))?;
        debug!(path = %path.display(), keys = self.entries.len(), "Store saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Deserialize the value under `key`, if present.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.entries
            .get(key)
            .map(|v| {
                serde_json::from_value(v.clone())
                    .with_context(|| format!("Stored value under '{key}' has unexpected shape"))
            })
            .transpose()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialise value for '{key}'"))?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Append `item` to the JSON array under `key` (created if missing).
    /// Returns the new array length.
    pub fn push<T: Serialize>(&mut self, key: &str, item: &T) -> Result<usize> {
        let item = serde_json::to_value(item)
            .with_context(|| format!("Failed to serialise item for '{key}'"))?;
        let slot = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => {
                items.push(item);
                Ok(items.len())
            }
            _ => anyhow::bail!("Stored value under '{key}' is not a list"),
        }
    }

    /// Deserialize the array under `key`; a missing key is an empty list.
    pub fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.get_as::<Vec<T>>(key)?.unwrap_or_default())
    }
}

/// Delete a store file (for testing or reset).
pub fn delete_store(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete store file {}", path.display()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path() -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("hub_test_store_{}.json", uuid::Uuid::new_v4()));
        p
    }

    #[test]
    fn test_save_and_reopen() {
        let path = temp_path();
        let mut store = LocalStore::open(&path).unwrap();
        store.set("adminLoginTime", &"2026-01-01T00:00:00Z").unwrap();
        store.push(MODIFICATION_REQUESTS_KEY, &json!({"id": 1})).unwrap();
        store.save().unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("adminLoginTime"),
            Some(&json!("2026-01-01T00:00:00Z"))
        );
        let list: Vec<Value> = reopened.list(MODIFICATION_REQUESTS_KEY).unwrap();
        assert_eq!(list.len(), 1);

        delete_store(&path).unwrap();
    }

    #[test]
    fn test_open_missing_is_empty() {
        let store = LocalStore::open("/tmp/hub_nonexistent_store_12345.json").unwrap();
        assert!(store.get("anything").is_none());
    }

    #[test]
    fn test_open_corrupt_fails() {
        let path = temp_path();
        std::fs::write(&path, "not json").unwrap();
        assert!(LocalStore::open(&path).is_err());
        delete_store(&path).unwrap();
    }

    #[test]
    fn test_push_appends() {
        let mut store = LocalStore::in_memory();
        assert_eq!(store.push("k", &1).unwrap(), 1);
        assert_eq!(store.push("k", &2).unwrap(), 2);
        assert_eq!(store.list::<i32>("k").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_push_onto_scalar_fails() {
        let mut store = LocalStore::in_memory();
        store.set("flag", &true).unwrap();
        assert!(store.push("flag", &1).is_err());
    }

    #[test]
    fn test_get_as_wrong_shape() {
        let mut store = LocalStore::in_memory();
        store.set("n", &"text").unwrap();
        assert!(store.get_as::<u32>("n").is_err());
        assert_eq!(store.get_as::<u32>("missing").unwrap(), None);
    }

    #[test]
    fn test_remove() {
        let mut store = LocalStore::in_memory();
        store.set("userToken", &"abc").unwrap();
        assert!(store.remove("userToken").is_some());
        assert!(store.get("userToken").is_none());
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        assert!(LocalStore::in_memory().save().is_ok());
    }

    #[test]
    fn test_delete_nonexistent_ok() {
        assert!(delete_store("/tmp/hub_does_not_exist_xyz.json").is_ok());
    }
}
