//! Reconciliation client configuration.
//!
//! Both endpoints are optional. The flow only runs when both are present,
//! so leaving either unset is the supported way to switch it off.

use url::Url;

/// Configuration for the existence check and creation redirect.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ReconConfig {
    /// Publisher endpoint answering "has associated account".
    pub has_associated_account_url: Option<Url>,
    /// Where the reader is sent to create an account after consenting.
    pub account_creation_redirect_url: Option<Url>,
    /// Bearer token sent with existence checks.
    pub api_token: Option<String>,
    /// Reader identifier appended as auth context.
    pub reader_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ReconConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconConfig")
            .field("has_associated_account_url", &self.has_associated_account_url)
            .field(
                "account_creation_redirect_url",
                &self.account_creation_redirect_url,
            )
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("reader_id", &self.reader_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            has_associated_account_url: None,
            account_creation_redirect_url: None,
            api_token: None,
            reader_id: None,
            timeout_secs: 30,
        }
    }
}

impl ReconConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RECON_HAS_ACCOUNT_URL` (optional)
    /// - `RECON_ACCOUNT_CREATION_URL` (optional)
    /// - `RECON_API_TOKEN` (optional)
    /// - `RECON_READER_ID` (optional)
    /// - `RECON_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            has_associated_account_url: env_url("RECON_HAS_ACCOUNT_URL")?,
            account_creation_redirect_url: env_url("RECON_ACCOUNT_CREATION_URL")?,
            api_token: env_nonempty("RECON_API_TOKEN"),
            reader_id: env_nonempty("RECON_READER_ID"),
            timeout_secs: std::env::var("RECON_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Whether both the existence endpoint and the redirect target are set.
    pub fn is_enabled(&self) -> bool {
        self.has_associated_account_url.is_some() && self.account_creation_redirect_url.is_some()
    }
}

fn env_nonempty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.trim().is_empty())
}

fn env_url(var: &str) -> Result<Option<Url>, ConfigError> {
    match env_nonempty(var) {
        None => Ok(None),
        Some(raw) => Url::parse(&raw)
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
