//! # Reconciliation Cache
//!
//! Boolean flags scoped by `(CachePurpose, entitlement content)`. No
//! in-memory layer: every call derives the key again and goes to the store,
//! so a flag written by an earlier run is always observed by the next.

use std::future::Future;
use std::sync::Arc;

use recon_core::{CacheKey, CachePurpose, Entitlement, KeyDeriver};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::CacheError;
use crate::store::DurableStore;

/// Purpose-scoped flag cache over a durable store.
///
/// Every method except [`ReconciliationCache::spawn_write`] works with or
/// without a Tokio runtime, as long as the store itself does.
#[derive(Clone)]
pub struct ReconciliationCache {
    store: Arc<dyn DurableStore>,
    keys: KeyDeriver,
}

impl std::fmt::Debug for ReconciliationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationCache")
            .field("store", &self.store.store_name())
            .field("keys", &self.keys)
            .finish()
    }
}

impl ReconciliationCache {
    /// Create a cache over `store` using `keys` for derivation.
    pub fn new(store: Arc<dyn DurableStore>, keys: KeyDeriver) -> Self {
        Self { store, keys }
    }

    /// The key deriver in use.
    pub fn key_deriver(&self) -> &KeyDeriver {
        &self.keys
    }

    /// Read the flag, surfacing every failure.
    pub async fn try_read(
        &self,
        purpose: CachePurpose,
        entitlement: &Entitlement,
    ) -> Result<Option<bool>, CacheError> {
        let key = self.keys.derive_key(purpose, entitlement)?;
        match self.store.get(key.as_str()).await? {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(flag)),
            Some(value) => Err(CacheError::UnexpectedValue {
                key: key.into_string(),
                value,
            }),
        }
    }

    /// Read the flag. Any failure reads as absent.
    pub async fn read(&self, purpose: CachePurpose, entitlement: &Entitlement) -> Option<bool> {
        match self.try_read(purpose, entitlement).await {
            Ok(value) => {
                tracing::debug!(%purpose, ?value, "cache read");
                value
            }
            Err(e) => {
                tracing::warn!(%purpose, error = %e, "cache read failed, treating as absent");
                None
            }
        }
    }

    /// Write the flag, surfacing every failure.
    pub async fn try_write(
        &self,
        purpose: CachePurpose,
        entitlement: &Entitlement,
        value: bool,
    ) -> Result<(), CacheError> {
        let key = self.keys.derive_key(purpose, entitlement)?;
        self.store.set(key.as_str(), Value::Bool(value)).await?;
        Ok(())
    }

    /// Write the flag. Failures are logged and dropped.
    pub async fn write(&self, purpose: CachePurpose, entitlement: &Entitlement, value: bool) {
        match self.try_write(purpose, entitlement, value).await {
            Ok(()) => tracing::debug!(%purpose, value, "cache write"),
            Err(e) => tracing::warn!(%purpose, error = %e, "cache write dropped"),
        }
    }

    /// Schedule the write on the runtime and return its handle.
    ///
    /// The write completes even if the caller stops polling before it does.
    /// Key derivation happens before the task is spawned, so an
    /// unkeyable entitlement never starts a task.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime. Use [`Self::write_through`]
    /// where no runtime is guaranteed.
    pub fn spawn_write(
        &self,
        purpose: CachePurpose,
        entitlement: &Entitlement,
        value: bool,
    ) -> JoinHandle<()> {
        match self.write_task(purpose, entitlement, value) {
            Some(task) => tokio::spawn(task),
            None => tokio::spawn(async {}),
        }
    }

    /// Write the flag and wait for it to land. Failures are logged and
    /// dropped.
    ///
    /// Inside a Tokio runtime the write runs as its own task, so it still
    /// completes if this future is dropped. Outside one it runs inline.
    pub async fn write_through(&self, purpose: CachePurpose, entitlement: &Entitlement, value: bool) {
        let Some(task) = self.write_task(purpose, entitlement, value) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                if let Err(e) = handle.spawn(task).await {
                    tracing::warn!(%purpose, error = %e, "cache write task failed");
                }
            }
            Err(_) => task.await,
        }
    }

    fn write_task(
        &self,
        purpose: CachePurpose,
        entitlement: &Entitlement,
        value: bool,
    ) -> Option<impl Future<Output = ()> + Send + 'static> {
        let key = match self.keys.derive_key(purpose, entitlement) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(%purpose, error = %e, "cache write dropped");
                return None;
            }
        };
        let store = Arc::clone(&self.store);
        Some(async move {
            match store.set(key.as_str(), Value::Bool(value)).await {
                Ok(()) => tracing::debug!(%purpose, value, "cache write"),
                Err(e) => tracing::warn!(%purpose, error = %e, "cache write dropped"),
            }
        })
    }

    /// Derive the key a purpose maps to, for diagnostics.
    pub fn key_for(&self, purpose: CachePurpose, entitlement: &Entitlement) -> Option<CacheKey> {
        self.keys.derive_key(purpose, entitlement).ok()
    }
}
