//! Shared helpers: entitlement loading and store selection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use recon_cache::{DurableStore, JsonFileStore, ReconciliationCache, UnavailableStore};
use recon_core::{Entitlement, KeyDeriver};

/// Store selection flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// JSON file backing the durable store.
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Run as if durable storage were unavailable.
    #[arg(long, global = true, conflicts_with = "store")]
    pub no_store: bool,
}

impl StoreArgs {
    /// Path the JSON store would use.
    pub fn resolved_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(default_store_path)
    }

    /// Open the selected store.
    pub fn open(&self) -> Arc<dyn DurableStore> {
        if self.no_store {
            return Arc::new(UnavailableStore::new("disabled by --no-store"));
        }
        let path = self.resolved_path();
        tracing::debug!(path = %path.display(), "using json file store");
        Arc::new(JsonFileStore::new(path))
    }

    /// Cache over the selected store with the default key deriver.
    pub fn cache(&self) -> ReconciliationCache {
        ReconciliationCache::new(self.open(), KeyDeriver::default())
    }
}

/// `$HOME/.recon/store.json`, or `.recon-store.json` in the working
/// directory when no home is known.
pub fn default_store_path() -> PathBuf {
    match std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(".recon").join("store.json"),
        None => PathBuf::from(".recon-store.json"),
    }
}

/// Read and parse an entitlement JSON file.
pub fn load_entitlement(path: &Path) -> anyhow::Result<Entitlement> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading entitlement from {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing entitlement in {}", path.display()))
}
