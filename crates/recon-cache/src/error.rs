//! Cache and store error types.

use recon_core::KeyError;
use thiserror::Error;

/// Errors from a durable store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store is absent or refuses service in this environment.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backing file could not be read or written.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing data is not a JSON object.
    #[error("store contents corrupt: {0}")]
    Corrupt(String),
}

/// Errors from a cache operation before the absent-on-failure policy is
/// applied.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No key could be derived for the entitlement.
    #[error("key derivation failed: {0}")]
    Key(#[from] KeyError),

    /// The store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The stored value is not a boolean flag.
    #[error("unexpected value under {key}: {value}")]
    UnexpectedValue {
        /// Key that was read.
        key: String,
        /// Value found there.
        value: serde_json::Value,
    },
}
