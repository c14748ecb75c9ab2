//! # Consent Orchestrator
//!
//! Drives one reconciliation run. Steps are strictly sequential: the
//! refusal memory is read before the existence check, and the reader is
//! prompted only after a confirmed "not found".
//!
//! The feature gate is evaluated once at the top of [`ConsentOrchestrator::run`]:
//! without both an existence checker and a redirect target the run returns
//! `FlowOutcome::Disabled` and touches no collaborator.

use std::sync::Arc;

use recon_cache::ReconciliationCache;
use recon_client::{JsonTransport, ReconConfig, UrlBuilder};
use recon_core::{CachePurpose, Entitlement};
use url::Url;

use crate::collaborators::{ConsentPrompt, Navigator};
use crate::error::FlowError;
use crate::existence::{AccountExistence, AccountExistenceChecker};
use crate::state::{FlowOutcome, FlowReport, FlowRun, FlowState, ReconciliationOutcome};

/// Top-level deferred account-creation flow.
///
/// `run` needs no Tokio runtime of its own; cache writes are detached onto
/// one when present. The collaborators decide their own requirements
/// (`HttpTransport` and `JsonFileStore` need Tokio).
#[derive(Clone)]
pub struct ConsentOrchestrator {
    cache: ReconciliationCache,
    existence: Option<Arc<dyn AccountExistence>>,
    redirect_url: Option<Url>,
    consent: Arc<dyn ConsentPrompt>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ConsentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentOrchestrator")
            .field("cache", &self.cache)
            .field("existence_configured", &self.existence.is_some())
            .field("redirect_url", &self.redirect_url.as_ref().map(Url::as_str))
            .finish()
    }
}

impl ConsentOrchestrator {
    /// Create an orchestrator from explicit collaborators.
    ///
    /// Passing `None` for either `existence` or `redirect_url` disables the
    /// flow.
    pub fn new(
        cache: ReconciliationCache,
        existence: Option<Arc<dyn AccountExistence>>,
        redirect_url: Option<Url>,
        consent: Arc<dyn ConsentPrompt>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            cache,
            existence,
            redirect_url,
            consent,
            navigator,
        }
    }

    /// Wire the production existence checker from configuration.
    pub fn from_config(
        config: &ReconConfig,
        cache: ReconciliationCache,
        transport: Arc<dyn JsonTransport>,
        urls: Arc<dyn UrlBuilder>,
        consent: Arc<dyn ConsentPrompt>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let existence = AccountExistenceChecker::from_config(config, cache.clone(), transport, urls)
            .map(|checker| Arc::new(checker) as Arc<dyn AccountExistence>);
        Self::new(
            cache,
            existence,
            config.account_creation_redirect_url.clone(),
            consent,
            navigator,
        )
    }

    /// Whether both the existence check and the redirect target are set.
    pub fn is_enabled(&self) -> bool {
        self.existence.is_some() && self.redirect_url.is_some()
    }

    /// Run the flow for `entitlement`.
    ///
    /// # Errors
    ///
    /// `FlowError::ExistenceCheck` if the existence check fails (the reader
    /// is not prompted), `FlowError::Consent` / `FlowError::Navigation` if
    /// those collaborators fail. Storage failures are never returned.
    pub async fn run(&self, entitlement: &Entitlement) -> Result<FlowReport, FlowError> {
        let (existence, redirect_url) = match (&self.existence, &self.redirect_url) {
            (Some(existence), Some(redirect_url)) => (existence, redirect_url),
            _ => {
                tracing::debug!("reconciliation disabled: endpoints not configured");
                return Ok(FlowReport::disabled());
            }
        };

        let mut run = FlowRun::new();
        run.advance(FlowState::CheckRejection, "flow started")?;

        let rejected = self
            .cache
            .read(CachePurpose::RejectedCreation, entitlement)
            .await;
        if rejected == Some(true) {
            tracing::info!(source = %entitlement.source, "account creation declined earlier, not prompting");
            return run.finish(FlowOutcome::PreviouslyRejected, "creation declined earlier");
        }
        run.advance(FlowState::CheckExistence, "no remembered refusal")?;

        let result = existence.exists(entitlement).await?;
        run.set_existence(ReconciliationOutcome::from(result.found));
        if result.found {
            tracing::info!(source = %entitlement.source, "publisher account exists");
            return run.finish(FlowOutcome::AccountExists, "account exists");
        }
        run.advance(FlowState::AwaitConsent, "no account found")?;

        let granted = self.consent.consent_deferred_account_creation().await?;
        if granted {
            run.advance(FlowState::Redirecting, "reader consented")?;
            tracing::info!(url = %redirect_url, "redirecting to account creation");
            self.navigator.navigate_to(redirect_url)?;
            run.finish(FlowOutcome::Redirected, "redirect issued")
        } else {
            run.advance(FlowState::RecordingRejection, "reader declined")?;
            self.cache
                .write_through(CachePurpose::RejectedCreation, entitlement, true)
                .await;
            tracing::info!(source = %entitlement.source, "account creation declined");
            run.finish(FlowOutcome::RejectionRecorded, "refusal remembered")
        }
    }
}
