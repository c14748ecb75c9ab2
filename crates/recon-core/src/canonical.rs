//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only input accepted by key derivation. It is built
//! by serializing a value to JSON and emitting RFC 8785 (JCS) output: sorted
//! keys, compact separators, UTF-8, and ECMAScript number formatting.
//!
//! Field order in the caller's struct, whitespace, map insertion order, and
//! the textual form a number arrived in therefore never influence a cache key.

use serde::Serialize;
use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - Constructed only through [`CanonicalBytes::new`].
/// - Object keys are sorted; separators are compact.
/// - Numbers, floats included, use the JCS shortest round-trip form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `SerializationFailed` if serde cannot represent the value as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
