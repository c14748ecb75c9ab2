//! # Run Subcommand
//!
//! Drives the consent flow for one entitlement file. Endpoints come from
//! the `RECON_*` environment, with flags taking precedence.
//!
//! Exit codes: 0 when the flow reached a terminal outcome (including
//! disabled), 1 on an existence, consent, or navigation failure.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use recon_client::{AuthQueryUrlBuilder, HttpTransport, ReconConfig};
use recon_flow::{ConsentOrchestrator, ConsentPrompt, FlowReport};
use url::Url;

use crate::common::{load_entitlement, StoreArgs};
use crate::interactive::{ConsentMode, FixedConsent, StdoutNavigator, TerminalConsent};

/// Arguments for `recon run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Entitlement JSON file.
    #[arg(long, short)]
    pub entitlement: PathBuf,

    /// How to answer the account creation prompt.
    #[arg(long, value_enum, default_value_t = ConsentMode::Prompt)]
    pub consent: ConsentMode,

    /// Existence check endpoint. Overrides `RECON_HAS_ACCOUNT_URL`.
    #[arg(long)]
    pub has_account_url: Option<Url>,

    /// Account creation redirect. Overrides `RECON_ACCOUNT_CREATION_URL`.
    #[arg(long)]
    pub creation_url: Option<Url>,

    /// Reader identifier. Overrides `RECON_READER_ID`.
    #[arg(long)]
    pub reader_id: Option<String>,

    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Apply flag overrides on top of an environment-derived config.
    pub fn apply(&self, mut config: ReconConfig) -> ReconConfig {
        if let Some(url) = &self.has_account_url {
            config.has_associated_account_url = Some(url.clone());
        }
        if let Some(url) = &self.creation_url {
            config.account_creation_redirect_url = Some(url.clone());
        }
        if let Some(rid) = &self.reader_id {
            config.reader_id = Some(rid.clone());
        }
        config
    }

    fn prompt(&self) -> Arc<dyn ConsentPrompt> {
        match self.consent {
            ConsentMode::Prompt => Arc::new(TerminalConsent),
            ConsentMode::Accept => Arc::new(FixedConsent(true)),
            ConsentMode::Decline => Arc::new(FixedConsent(false)),
        }
    }
}

/// Execute `recon run`.
pub async fn run_run(args: &RunArgs, store: &StoreArgs) -> Result<u8> {
    let config = args.apply(ReconConfig::from_env().context("loading RECON_* configuration")?);
    tracing::debug!(?config, "resolved configuration");

    let entitlement = load_entitlement(&args.entitlement)?;
    let transport = HttpTransport::new(&config).context("building HTTP client")?;
    let orchestrator = ConsentOrchestrator::from_config(
        &config,
        store.cache(),
        Arc::new(transport),
        Arc::new(AuthQueryUrlBuilder::from_config(&config)),
        args.prompt(),
        Arc::new(StdoutNavigator),
    );

    if !orchestrator.is_enabled() {
        tracing::info!("reconciliation disabled: both endpoints must be configured");
    }

    let report = orchestrator.run(&entitlement).await?;
    print_report(&report, args.json)?;
    Ok(0)
}

fn print_report(report: &FlowReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("outcome: {}", report.outcome);
    println!("existence: {:?}", report.existence);
    let path: Vec<String> = report.path().iter().map(ToString::to_string).collect();
    if !path.is_empty() {
        println!("path: {}", path.join(" -> "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            entitlement: PathBuf::from("e.json"),
            consent: ConsentMode::Decline,
            has_account_url: None,
            creation_url: None,
            reader_id: None,
            json: false,
        }
    }

    #[test]
    fn flags_override_environment_config() {
        let mut a = args();
        a.has_account_url = Some("https://flag.example/has".parse().unwrap());
        a.reader_id = Some("flag-reader".into());

        let base = ReconConfig {
            has_associated_account_url: Some("https://env.example/has".parse().unwrap()),
            account_creation_redirect_url: Some("https://env.example/create".parse().unwrap()),
            reader_id: Some("env-reader".into()),
            ..ReconConfig::default()
        };
        let merged = a.apply(base);

        assert_eq!(
            merged.has_associated_account_url.unwrap().as_str(),
            "https://flag.example/has"
        );
        assert_eq!(
            merged.account_creation_redirect_url.unwrap().as_str(),
            "https://env.example/create"
        );
        assert_eq!(merged.reader_id.as_deref(), Some("flag-reader"));
    }

    #[test]
    fn missing_flags_keep_environment_values() {
        let base = ReconConfig {
            api_token: Some("t".into()),
            timeout_secs: 7,
            ..ReconConfig::default()
        };
        let merged = args().apply(base);
        assert_eq!(merged.api_token.as_deref(), Some("t"));
        assert_eq!(merged.timeout_secs, 7);
        assert!(!merged.is_enabled());
    }

    #[tokio::test]
    async fn unconfigured_run_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e.json");
        std::fs::write(
            &path,
            r#"{"source":"google","service":"s","granted":true,"grantReason":"FREE","raw":"r"}"#,
        )
        .unwrap();

        let mut a = args();
        a.entitlement = path;
        a.has_account_url = Some("http://127.0.0.1:9/has".parse().unwrap());
        let store = StoreArgs {
            store: None,
            no_store: true,
        };
        // Only one endpoint configured, so the flow stays off.
        std::env::remove_var("RECON_ACCOUNT_CREATION_URL");
        assert_eq!(run_run(&a, &store).await.unwrap(), 0);
    }
}
