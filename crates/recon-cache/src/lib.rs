//! # recon-cache: Reconciliation Cache
//!
//! Purpose-scoped boolean flags keyed by entitlement content, persisted in a
//! durable key-value store supplied by the environment.
//!
//! ## Failure Policy
//!
//! The store may be missing or broken. The cache never propagates that:
//!
//! - a read that fails for any reason (key derivation, store, unexpected
//!   value) is reported as "absent";
//! - a write that fails is logged and dropped.
//!
//! The fallible forms (`try_read`, `try_write`) are public so the policy is a
//! visible mapping rather than a swallowed error.
//!
//! ## Stores
//!
//! - [`MemoryStore`]: process-local map, for tests and embedding.
//! - [`JsonFileStore`]: one JSON object on disk, survives restarts.
//! - [`UnavailableStore`]: every call fails, modelling an environment with
//!   no durable storage.

pub mod cache;
pub mod error;
pub mod store;

pub use cache::ReconciliationCache;
pub use error::{CacheError, StoreError};
pub use store::{DurableStore, JsonFileStore, MemoryStore, UnavailableStore};
