//! # Error Types
//!
//! Errors raised while turning an entitlement into a cache key. None of
//! these ever reach the caller of the reconciliation flow directly: the cache
//! layer maps every `KeyError` to "no cached value".

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error raised by a digest primitive.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The execution environment has no usable digest implementation.
    #[error("digest primitive unavailable: {0}")]
    Unavailable(String),

    /// The primitive produced an output of unexpected length.
    #[error("digest output length {actual}, expected {expected}")]
    OutputLength {
        /// Expected length in bytes.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },
}

/// Error deriving a cache key.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The entitlement could not be canonicalized.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The digest primitive is missing or broken.
    #[error("crypto unavailable: {0}")]
    CryptoUnavailable(#[from] CryptoError),
}
