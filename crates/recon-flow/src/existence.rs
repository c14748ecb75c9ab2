//! # Account Existence Check
//!
//! Answers "does the publisher have an account for this entitlement?".
//!
//! 1. Read `HAS_ACCOUNT` from the cache; a hit returns without any network
//!    call.
//! 2. On a miss, POST `{"entitlements": <pingback view>}` to the configured
//!    endpoint (auth context included) and parse `{"found": bool}`.
//! 3. Schedule the write-back of `found` and wait for it before returning,
//!    so the next call observes it. Under a Tokio runtime the write runs as
//!    its own task and finishes even if this call is abandoned; without a
//!    runtime it runs inline.
//!
//! Failures are returned, never cached.

use std::sync::Arc;

use async_trait::async_trait;
use recon_cache::ReconciliationCache;
use recon_client::{JsonTransport, ReconConfig, UrlBuilder};
use recon_core::{CachePurpose, Entitlement};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ExistenceCheckError;

/// Where an existence answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultSource {
    /// Durable cache.
    Cache,
    /// Publisher endpoint.
    Remote,
}

/// Answer of an existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceResult {
    /// Whether an account exists.
    pub found: bool,
    /// Where the answer came from.
    pub source: ResultSource,
}

/// Anything that can answer the existence question.
#[async_trait]
pub trait AccountExistence: Send + Sync {
    /// Check whether an account exists for `entitlement`.
    async fn exists(&self, entitlement: &Entitlement) -> Result<ExistenceResult, ExistenceCheckError>;
}

#[derive(Debug, Serialize)]
struct HasAccountRequest<'a, T: Serialize> {
    entitlements: &'a T,
}

#[derive(Debug, Deserialize)]
struct HasAccountResponse {
    found: bool,
}

/// Cache-first existence checker backed by the publisher endpoint.
#[derive(Clone)]
pub struct AccountExistenceChecker {
    cache: ReconciliationCache,
    transport: Arc<dyn JsonTransport>,
    urls: Arc<dyn UrlBuilder>,
    endpoint: Url,
}

impl std::fmt::Debug for AccountExistenceChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountExistenceChecker")
            .field("cache", &self.cache)
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl AccountExistenceChecker {
    /// Create a checker against `endpoint`.
    pub fn new(
        cache: ReconciliationCache,
        transport: Arc<dyn JsonTransport>,
        urls: Arc<dyn UrlBuilder>,
        endpoint: Url,
    ) -> Self {
        Self {
            cache,
            transport,
            urls,
            endpoint,
        }
    }

    /// Create a checker from configuration, `None` when no endpoint is set.
    pub fn from_config(
        config: &ReconConfig,
        cache: ReconciliationCache,
        transport: Arc<dyn JsonTransport>,
        urls: Arc<dyn UrlBuilder>,
    ) -> Option<Self> {
        config
            .has_associated_account_url
            .clone()
            .map(|endpoint| Self::new(cache, transport, urls, endpoint))
    }

    async fn fetch_found(&self, entitlement: &Entitlement) -> Result<bool, ExistenceCheckError> {
        let url = self.urls.build_url(&self.endpoint, true).await?;
        let body = serde_json::to_value(HasAccountRequest {
            entitlements: &entitlement.pingback_view(),
        })
        .map_err(ExistenceCheckError::Encode)?;
        let response = self.transport.post_json(&url, &body).await?;
        let parsed: HasAccountResponse =
            serde_json::from_value(response).map_err(ExistenceCheckError::Parse)?;
        Ok(parsed.found)
    }
}

#[async_trait]
impl AccountExistence for AccountExistenceChecker {
    async fn exists(&self, entitlement: &Entitlement) -> Result<ExistenceResult, ExistenceCheckError> {
        if let Some(found) = self.cache.read(CachePurpose::HasAccount, entitlement).await {
            tracing::debug!(found, "existence answered from cache");
            return Ok(ExistenceResult {
                found,
                source: ResultSource::Cache,
            });
        }

        let found = match self.fetch_found(entitlement).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "existence check failed");
                return Err(e);
            }
        };
        tracing::info!(found, "existence answered by publisher");

        self.cache
            .write_through(CachePurpose::HasAccount, entitlement, found)
            .await;

        Ok(ExistenceResult {
            found,
            source: ResultSource::Remote,
        })
    }
}
