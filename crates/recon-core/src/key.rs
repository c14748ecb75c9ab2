//! # Cache Key Derivation
//!
//! A cache key is `PURPOSE + "_" + hex(digest(canonical entitlement))`.
//!
//! ## Invariants
//!
//! - Entitlements with identical canonical serialization derive the same key
//!   for the same purpose.
//! - Keys for different purposes never collide: each purpose contributes a
//!   distinct prefix and the digest suffix has a fixed length.
//! - Derivation is pure. The only fallible steps are canonicalization and the
//!   digest primitive itself.
//!
//! ## Versioning
//!
//! The canonicalization and hashing pipeline is tagged by [`KeyScheme`].
//! Changing either step must introduce a new scheme rather than silently
//! changing the bytes behind existing keys.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{to_hex, DigestPrimitive, Sha256Digest};
use crate::entitlement::Entitlement;
use crate::error::{CryptoError, KeyError};

/// Logical purpose a cache entry serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CachePurpose {
    /// Whether the publisher already has an account for the entitlement.
    HasAccount,
    /// Whether the reader declined deferred account creation.
    RejectedCreation,
}

impl CachePurpose {
    /// Every purpose, in declaration order.
    pub const ALL: [CachePurpose; 2] = [Self::HasAccount, Self::RejectedCreation];

    /// Key prefix for this purpose.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HasAccount => "HAS_ACCOUNT",
            Self::RejectedCreation => "REJECTED_CREATION",
        }
    }
}

impl std::fmt::Display for CachePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalization + hashing pipeline used to build key suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyScheme {
    /// RFC 8785 JCS over the canonical view (floats in JCS number form),
    /// then the injected digest, lowercase hex.
    JcsSha256V1,
}

/// A derived cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// The key as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives purpose-scoped cache keys from entitlements.
#[derive(Clone)]
pub struct KeyDeriver {
    digest: Arc<dyn DigestPrimitive>,
    scheme: KeyScheme,
}

impl std::fmt::Debug for KeyDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDeriver")
            .field("algorithm", &self.digest.algorithm())
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(Arc::new(Sha256Digest))
    }
}

impl KeyDeriver {
    /// Create a deriver over the given digest primitive.
    pub fn new(digest: Arc<dyn DigestPrimitive>) -> Self {
        Self {
            digest,
            scheme: KeyScheme::JcsSha256V1,
        }
    }

    /// The pipeline this deriver implements.
    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Derive the cache key for `purpose` and `entitlement`.
    ///
    /// # Errors
    ///
    /// `KeyError::Canonicalization` if serde cannot represent the
    /// entitlement as JSON; `KeyError::CryptoUnavailable` if the digest
    /// primitive fails.
    pub fn derive_key(
        &self,
        purpose: CachePurpose,
        entitlement: &Entitlement,
    ) -> Result<CacheKey, KeyError> {
        let canonical = CanonicalBytes::new(&entitlement.canonical_view())?;
        let digest = self.digest.digest(canonical.as_bytes())?;
        let expected = self.digest.algorithm().output_len();
        if digest.len() != expected {
            return Err(CryptoError::OutputLength {
                expected,
                actual: digest.len(),
            }
            .into());
        }
        Ok(CacheKey(format!("{}_{}", purpose.as_str(), to_hex(&digest))))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::entitlement::GrantReason;
    use proptest::prelude::*;

    proptest! {
        /// Reordering payload keys never changes the derived key.
        #[test]
        fn key_independent_of_payload_order(
            entries in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 1..8)
        ) {
            let forward: serde_json::Map<String, serde_json::Value> = entries
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            let mut reversed = serde_json::Map::new();
            for (k, v) in entries.iter().rev() {
                reversed.insert(k.clone(), serde_json::json!(v));
            }
            let base = Entitlement::new("s", "svc", true, GrantReason::Metering, "raw");
            let a = base.clone().with_data(serde_json::Value::Object(forward));
            let b = base.with_data(serde_json::Value::Object(reversed));
            let deriver = KeyDeriver::default();
            for purpose in CachePurpose::ALL {
                prop_assert_eq!(
                    deriver.derive_key(purpose, &a).unwrap(),
                    deriver.derive_key(purpose, &b).unwrap()
                );
            }
        }

        /// The two purposes yield distinct keys for any entitlement.
        #[test]
        fn purposes_distinct(source in "[a-zA-Z0-9]{0,24}", granted in any::<bool>()) {
            let e = Entitlement::new(source, "svc", granted, GrantReason::Free, "raw");
            let deriver = KeyDeriver::default();
            prop_assert_ne!(
                deriver.derive_key(CachePurpose::HasAccount, &e).unwrap(),
                deriver.derive_key(CachePurpose::RejectedCreation, &e).unwrap()
            );
        }
    }
}
