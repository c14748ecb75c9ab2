//! # Entitlement
//!
//! Proof that a reader holds access rights, issued by one platform and
//! carried through the reconciliation flow unchanged.
//!
//! Two projections are exposed:
//!
//! - [`Entitlement::canonical_view`]: every field except the raw token. This
//!   is what gets hashed into cache keys, so reissuing the same grant with a
//!   fresh token string still hits the same cache entry.
//! - [`Entitlement::pingback_view`]: the canonical view plus `raw`, which is
//!   the form the publisher's existence endpoint expects.

use serde::{Deserialize, Serialize};

/// Why the entitlement was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantReason {
    /// Paying subscriber.
    Subscriber,
    /// Metered access.
    Metering,
    /// Free content.
    Free,
    /// Subscription has lapsed.
    Lapsed,
    /// Issuer did not say.
    #[serde(other)]
    Unknown,
}

/// An entitlement as issued by the source platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    /// Identifier of the issuing platform.
    pub source: String,
    /// Service the entitlement was resolved by.
    #[serde(default)]
    pub service: String,
    /// Whether access is granted.
    #[serde(default)]
    pub granted: bool,
    /// Why access was granted.
    #[serde(default = "default_grant_reason")]
    pub grant_reason: GrantReason,
    /// Issuer-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Document key released by the issuer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decrypted_document_key: Option<String>,
    /// The opaque token exactly as issued.
    #[serde(default)]
    pub raw: String,
}

fn default_grant_reason() -> GrantReason {
    GrantReason::Unknown
}

/// Borrowed projection used for key derivation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalView<'a> {
    source: &'a str,
    service: &'a str,
    granted: bool,
    grant_reason: GrantReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decrypted_document_key: Option<&'a str>,
}

/// Borrowed projection sent to the existence endpoint.
#[derive(Debug, Serialize)]
pub struct PingbackView<'a> {
    raw: &'a str,
    #[serde(flatten)]
    canonical: CanonicalView<'a>,
}

impl Entitlement {
    /// Construct an entitlement with no payload.
    pub fn new(
        source: impl Into<String>,
        service: impl Into<String>,
        granted: bool,
        grant_reason: GrantReason,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            service: service.into(),
            granted,
            grant_reason,
            data: None,
            decrypted_document_key: None,
            raw: raw.into(),
        }
    }

    /// Attach an issuer payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Projection that participates in cache key derivation.
    pub fn canonical_view(&self) -> CanonicalView<'_> {
        CanonicalView {
            source: &self.source,
            service: &self.service,
            granted: self.granted,
            grant_reason: self.grant_reason,
            data: self.data.as_ref(),
            decrypted_document_key: self.decrypted_document_key.as_deref(),
        }
    }

    /// Pingback-safe serialization for server request bodies.
    pub fn pingback_view(&self) -> PingbackView<'_> {
        PingbackView {
            raw: &self.raw,
            canonical: self.canonical_view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entitlement {
        Entitlement::new("google", "subscribe.google.com", true, GrantReason::Subscriber, "tok-1")
            .with_data(serde_json::json!({"isReadyToPay": false}))
    }

    #[test]
    fn test_parse_wire_form() {
        let json = serde_json::json!({
            "source": "google",
            "service": "subscribe.google.com",
            "granted": true,
            "grantReason": "METERING",
            "raw": "tok-2"
        });
        let e: Entitlement = serde_json::from_value(json).unwrap();
        assert_eq!(e.grant_reason, GrantReason::Metering);
        assert!(e.data.is_none());
        assert_eq!(e.raw, "tok-2");
    }

    #[test]
    fn test_unrecognized_grant_reason_is_unknown() {
        let json = serde_json::json!({"source": "s", "grantReason": "PROMO"});
        let e: Entitlement = serde_json::from_value(json).unwrap();
        assert_eq!(e.grant_reason, GrantReason::Unknown);
        assert!(!e.granted);
    }

    #[test]
    fn test_canonical_view_excludes_raw() {
        let v = serde_json::to_value(sample().canonical_view()).unwrap();
        assert!(v.get("raw").is_none());
        assert_eq!(v["grantReason"], "SUBSCRIBER");
        assert_eq!(v["data"]["isReadyToPay"], false);
    }

    #[test]
    fn test_pingback_view_includes_raw_and_fields() {
        let v = serde_json::to_value(sample().pingback_view()).unwrap();
        assert_eq!(v["raw"], "tok-1");
        assert_eq!(v["source"], "google");
        assert_eq!(v["granted"], true);
        assert!(v.get("decryptedDocumentKey").is_none());
    }
}
