//! # Durable Key-Value Stores
//!
//! `DurableStore` is the contract the cache consumes: string keys, JSON
//! values, asynchronous `get` and `set`. Any call may fail; the cache decides
//! what a failure means.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A durable key-value store.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime store selection.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the value under `key`, `None` if never written.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Human-readable name of this backend, used in logs.
    fn store_name(&self) -> &str;
}

// ─── Memory ──────────────────────────────────────────────────────────

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of the value under `key`, without going through the async API.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}

// ─── JSON file ───────────────────────────────────────────────────────

/// Store persisted as a single JSON object on disk.
///
/// Every `get` re-reads the file. Each `set` is a load-modify-write held
/// under a lock shared by every handle on the same path in this process, and
/// lands through a uniquely named temp file in the target directory that is
/// then persisted over the store file. Writers in other processes race with
/// last-write-wins semantics.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let write_lock = path_lock(&path);
        Self { path, write_lock }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Corrupt(format!(
                "{}: expected object, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
            Err(e) => Err(StoreError::Corrupt(format!("{}: {e}", self.path.display()))),
        }
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        map.insert(key.to_string(), value);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;
        let bytes = serde_json::to_vec_pretty(&Value::Object(map))
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    fn store_name(&self) -> &str {
        "json-file"
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

type PathLocks = parking_lot::Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>;

/// Write lock shared by every `JsonFileStore` on `path` in this process.
///
/// Relative paths are resolved against the working directory so that
/// `store.json` and `./store.json` share a lock.
fn path_lock(path: &Path) -> Arc<tokio::sync::Mutex<()>> {
    static LOCKS: OnceLock<PathLocks> = OnceLock::new();
    let resolved: PathBuf = if path.is_absolute() {
        path.components().collect()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
            .components()
            .collect()
    };
    Arc::clone(
        LOCKS
            .get_or_init(Default::default)
            .lock()
            .entry(resolved)
            .or_default(),
    )
}

// ─── Unavailable ─────────────────────────────────────────────────────

/// A store that fails every call.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    /// Create a store that reports `reason` on every call.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DurableStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    fn store_name(&self) -> &str {
        "unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", json!(true)).await.unwrap();
        store.set("k", json!(false)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(false)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn file_store_missing_file_reads_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        JsonFileStore::new(&path).set("a", json!(true)).await.unwrap();
        JsonFileStore::new(&path).set("b", json!(false)).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("a").await.unwrap(), Some(json!(true)));
        assert_eq!(reopened.get("b").await.unwrap(), Some(json!(false)));
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("store.json")]);
    }

    #[test]
    fn handles_on_one_path_share_a_lock() {
        let dir = tempfile::tempdir().unwrap();
        let a = JsonFileStore::new(dir.path().join("store.json"));
        let b = JsonFileStore::new(dir.path().join(".").join("store.json"));
        let c = JsonFileStore::new(dir.path().join("other.json"));
        assert!(Arc::ptr_eq(&a.write_lock, &b.write_lock));
        assert!(!Arc::ptr_eq(&a.write_lock, &c.write_lock));
    }

    #[tokio::test]
    async fn file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = JsonFileStore::new(&path).get("a").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn unavailable_store_always_fails() {
        let store = UnavailableStore::new("storage disabled");
        assert!(matches!(
            store.get("k").await,
            Err(StoreError::Unavailable(reason)) if reason == "storage disabled"
        ));
        assert!(store.set("k", json!(true)).await.is_err());
    }
}
