//! Platform collaborators the orchestrator drives but does not implement.

use async_trait::async_trait;
use url::Url;

/// Presents the deferred account-creation prompt.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`.
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Ask the reader; `true` means create the account.
    async fn consent_deferred_account_creation(&self) -> Result<bool, ConsentError>;
}

/// Sends the reader somewhere else. Fire-and-forget: once called, the
/// current flow is no longer relevant.
pub trait Navigator: Send + Sync {
    /// Navigate to `url`.
    fn navigate_to(&self, url: &Url) -> Result<(), NavigationError>;
}

/// Failure inside the consent UI.
#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    /// No UI is available to ask the reader.
    #[error("consent prompt unavailable: {0}")]
    Unavailable(String),
    /// The prompt was shown but could not produce a decision.
    #[error("consent prompt failed: {0}")]
    Failed(String),
}

/// Failure performing a navigation.
#[derive(Debug, thiserror::Error)]
#[error("navigation to {url} failed: {reason}")]
pub struct NavigationError {
    /// Target of the navigation.
    pub url: String,
    /// Why it failed.
    pub reason: String,
}
