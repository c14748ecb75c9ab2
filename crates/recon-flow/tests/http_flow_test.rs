//! End-to-end run against a wiremock publisher endpoint using the
//! production transport and URL builder.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use recon_cache::{MemoryStore, ReconciliationCache};
use recon_client::{AuthQueryUrlBuilder, HttpTransport, ReconConfig};
use recon_core::{Entitlement, GrantReason, KeyDeriver};
use recon_flow::{
    ConsentError, ConsentOrchestrator, ConsentPrompt, ExistenceCheckError, FlowError,
    FlowOutcome, NavigationError, Navigator,
};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Decline;

#[async_trait]
impl ConsentPrompt for Decline {
    async fn consent_deferred_account_creation(&self) -> Result<bool, ConsentError> {
        Ok(false)
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Url>>);

impl Navigator for Recorder {
    fn navigate_to(&self, url: &Url) -> Result<(), NavigationError> {
        self.0.lock().push(url.clone());
        Ok(())
    }
}

fn config(server: &MockServer) -> ReconConfig {
    ReconConfig {
        has_associated_account_url: Some(format!("{}/has-account", server.uri()).parse().unwrap()),
        account_creation_redirect_url: Some("https://pub.example/create".parse().unwrap()),
        api_token: None,
        reader_id: Some("reader-7".into()),
        timeout_secs: 5,
    }
}

fn orchestrator(config: &ReconConfig, navigator: Arc<Recorder>) -> ConsentOrchestrator {
    let cache = ReconciliationCache::new(Arc::new(MemoryStore::new()), KeyDeriver::default());
    ConsentOrchestrator::from_config(
        config,
        cache,
        Arc::new(HttpTransport::new(config).unwrap()),
        Arc::new(AuthQueryUrlBuilder::from_config(config)),
        Arc::new(Decline),
        navigator,
    )
}

fn entitlement() -> Entitlement {
    Entitlement::new("google", "subscribe.google.com", true, GrantReason::Metering, "raw-token")
}

#[tokio::test]
async fn declined_flow_checks_endpoint_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/has-account"))
        .and(query_param("rid", "reader-7"))
        .and(body_partial_json(serde_json::json!({
            "entitlements": {"source": "google", "raw": "raw-token", "grantReason": "METERING"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"found": false})))
        .expect(1)
        .mount(&server)
        .await;

    let navigator = Arc::new(Recorder::default());
    let flow = orchestrator(&config(&server), navigator.clone());
    let e = entitlement();

    assert_eq!(flow.run(&e).await.unwrap().outcome, FlowOutcome::RejectionRecorded);
    assert_eq!(flow.run(&e).await.unwrap().outcome, FlowOutcome::PreviouslyRejected);
    assert!(navigator.0.lock().is_empty());
}

#[tokio::test]
async fn server_error_surfaces_as_existence_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/has-account"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let flow = orchestrator(&config(&server), Arc::new(Recorder::default()));
    let err = flow.run(&entitlement()).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::ExistenceCheck(ExistenceCheckError::Transport(_))
    ));
}

#[tokio::test]
async fn missing_redirect_disables_flow() {
    let server = MockServer::start().await;
    let mut cfg = config(&server);
    cfg.account_creation_redirect_url = None;

    let flow = orchestrator(&cfg, Arc::new(Recorder::default()));
    assert!(!flow.is_enabled());
    assert_eq!(flow.run(&entitlement()).await.unwrap().outcome, FlowOutcome::Disabled);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
