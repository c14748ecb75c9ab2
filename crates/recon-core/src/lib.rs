//! # recon-core: Foundational Types for Entitlement Reconciliation
//!
//! Leaf crate of the reconciliation workspace. Defines the entitlement model
//! consumed by the deferred account-creation flow and the deterministic,
//! purpose-scoped cache key derivation that the cache layer is built on.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every digest used as a cache key is
//!    computed over `CanonicalBytes`, produced by RFC 8785 (JCS)
//!    serialization. Two entitlements with the same content always hash to
//!    the same key regardless of field order.
//!
//! 2. **Injected digest primitive.** `KeyDeriver` never calls a hash function
//!    directly; it goes through `DigestPrimitive`. An environment without a
//!    working primitive surfaces `KeyError::CryptoUnavailable` instead of
//!    panicking.
//!
//! 3. **Closed purpose set.** `CachePurpose` is an enum, so a key can only be
//!    derived for a purpose the flow knows about, and every purpose carries a
//!    distinct prefix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `recon-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod entitlement;
pub mod error;
pub mod key;

pub use canonical::CanonicalBytes;
pub use digest::{DigestAlgorithm, DigestPrimitive, Sha256Digest};
pub use entitlement::{Entitlement, GrantReason};
pub use error::{CanonicalizationError, CryptoError, KeyError};
pub use key::{CacheKey, CachePurpose, KeyDeriver, KeyScheme};
