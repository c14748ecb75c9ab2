//! Flow error types.

use recon_client::{TransportError, UrlBuildError};
use thiserror::Error;

use crate::collaborators::{ConsentError, NavigationError};
use crate::state::FlowState;

/// The existence check could not produce a confirmed answer.
///
/// Never cached: a failure must not be remembered as "not found".
#[derive(Error, Debug)]
pub enum ExistenceCheckError {
    /// Request URL could not be built.
    #[error("existence check url: {0}")]
    UrlBuild(#[from] UrlBuildError),

    /// Request body could not be encoded.
    #[error("existence check request encoding: {0}")]
    Encode(#[source] serde_json::Error),

    /// Network call failed.
    #[error("existence check transport: {0}")]
    Transport(#[from] TransportError),

    /// Response did not carry a boolean `found`.
    #[error("existence check response unparseable: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Errors surfaced by a reconciliation run.
#[derive(Error, Debug)]
pub enum FlowError {
    /// Existence check failed; the reader was not prompted.
    #[error(transparent)]
    ExistenceCheck(#[from] ExistenceCheckError),

    /// Consent collaborator failed.
    #[error(transparent)]
    Consent(#[from] ConsentError),

    /// Navigation collaborator failed.
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Attempted an edge the state machine does not have.
    #[error("invalid flow transition: {from} -> {to}")]
    InvalidTransition {
        /// State before the attempted transition.
        from: FlowState,
        /// Attempted target state.
        to: FlowState,
    },
}
