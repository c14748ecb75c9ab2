//! # Digest Primitive
//!
//! The one-way hash used for cache key derivation, behind a trait so that
//! the environment supplies it rather than the key deriver reaching for a
//! global. `Sha256Digest` is the production implementation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// Hash algorithm tag carried by every digest primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256, 32-byte output.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }

    /// Output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A one-way, collision-resistant hash function.
///
/// Implementations must be `Send + Sync` so a single instance can be shared
/// behind an `Arc` by every cache handle.
pub trait DigestPrimitive: Send + Sync {
    /// Algorithm produced by this primitive.
    fn algorithm(&self) -> DigestAlgorithm;

    /// Hash `data`.
    ///
    /// # Errors
    ///
    /// `CryptoError::Unavailable` when the environment cannot compute
    /// digests.
    fn digest(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// SHA-256 backed by the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestPrimitive for Sha256Digest {
    fn algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Sha256
    }

    fn digest(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(Sha256::digest(data).to_vec())
    }
}

/// Render bytes as lowercase hex.
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let out = Sha256Digest.digest(b"{}").unwrap();
        assert_eq!(
            to_hex(&out),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_output_len_matches_algorithm() {
        let out = Sha256Digest.digest(b"entitlement").unwrap();
        assert_eq!(out.len(), Sha256Digest.algorithm().output_len());
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
    }
}
