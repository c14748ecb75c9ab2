//! # Reconciliation State Machine
//!
//! ```text
//! Start ──▶ CheckRejection ──▶ CheckExistence ──▶ AwaitConsent ──▶ Redirecting ──────▶ Done
//!                 │                  │                  │
//!                 │                  │                  └──▶ RecordingRejection ──▶ Done
//!                 └──▶ Done          └──▶ Done
//!            (declined before)   (account found)
//! ```
//!
//! `Done` is the only terminal state. A run that is switched off by
//! configuration never leaves `Start` and records no transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// State of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// Run created, nothing read yet.
    Start,
    /// Reading the remembered refusal.
    CheckRejection,
    /// Asking whether an account exists.
    CheckExistence,
    /// Waiting on the reader's decision.
    AwaitConsent,
    /// Sending the reader to account creation.
    Redirecting,
    /// Remembering the reader's refusal.
    RecordingRejection,
    /// Run finished (terminal).
    Done,
}

impl FlowState {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Whether `to` is a legal next state.
    pub fn can_transition_to(&self, to: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (self, to),
            (Start, CheckRejection)
                | (CheckRejection, CheckExistence)
                | (CheckRejection, Done)
                | (CheckExistence, AwaitConsent)
                | (CheckExistence, Done)
                | (AwaitConsent, Redirecting)
                | (AwaitConsent, RecordingRejection)
                | (Redirecting, Done)
                | (RecordingRejection, Done)
        )
    }
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "START",
            Self::CheckRejection => "CHECK_REJECTION",
            Self::CheckExistence => "CHECK_EXISTENCE",
            Self::AwaitConsent => "AWAIT_CONSENT",
            Self::Redirecting => "REDIRECTING",
            Self::RecordingRejection => "RECORDING_REJECTION",
            Self::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// Result of the existence check as seen during a run.
///
/// `Unknown` only exists while the check is in flight or was never reached;
/// it is never written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconciliationOutcome {
    /// Not yet known.
    Unknown,
    /// Publisher has an account.
    Found,
    /// Publisher has no account.
    NotFound,
}

impl From<bool> for ReconciliationOutcome {
    fn from(found: bool) -> Self {
        if found {
            Self::Found
        } else {
            Self::NotFound
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowOutcome {
    /// Endpoints not configured; nothing ran.
    Disabled,
    /// Reader declined earlier; nothing asked.
    PreviouslyRejected,
    /// Account already exists.
    AccountExists,
    /// Reader consented and was redirected.
    Redirected,
    /// Reader declined; refusal remembered (best effort).
    RejectionRecorded,
}

impl std::fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disabled => "DISABLED",
            Self::PreviouslyRejected => "PREVIOUSLY_REJECTED",
            Self::AccountExists => "ACCOUNT_EXISTS",
            Self::Redirected => "REDIRECTED",
            Self::RejectionRecorded => "REJECTION_RECORDED",
        };
        f.write_str(s)
    }
}

/// Record of a state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowTransitionRecord {
    /// State before the transition.
    pub from_state: FlowState,
    /// State after the transition.
    pub to_state: FlowState,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// Reason for the transition.
    pub reason: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowReport {
    /// How the run ended.
    pub outcome: FlowOutcome,
    /// What the existence check concluded, if it ran.
    pub existence: ReconciliationOutcome,
    /// Ordered transition log.
    pub transitions: Vec<FlowTransitionRecord>,
}

impl FlowReport {
    /// Report for a run that was switched off.
    pub(crate) fn disabled() -> Self {
        Self {
            outcome: FlowOutcome::Disabled,
            existence: ReconciliationOutcome::Unknown,
            transitions: Vec::new(),
        }
    }

    /// States visited, starting with `Start`.
    pub fn path(&self) -> Vec<FlowState> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.first() {
            path.push(first.from_state);
        }
        path.extend(self.transitions.iter().map(|t| t.to_state));
        path
    }
}

/// In-progress run.
#[derive(Debug)]
pub(crate) struct FlowRun {
    state: FlowState,
    existence: ReconciliationOutcome,
    transitions: Vec<FlowTransitionRecord>,
}

impl FlowRun {
    pub(crate) fn new() -> Self {
        Self {
            state: FlowState::Start,
            existence: ReconciliationOutcome::Unknown,
            transitions: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> FlowState {
        self.state
    }

    pub(crate) fn set_existence(&mut self, outcome: ReconciliationOutcome) {
        self.existence = outcome;
    }

    pub(crate) fn advance(&mut self, to: FlowState, reason: &str) -> Result<(), FlowError> {
        if !self.state.can_transition_to(to) {
            return Err(FlowError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::debug!(from = %self.state, to = %to, reason, "flow transition");
        self.transitions.push(FlowTransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.state = to;
        Ok(())
    }

    pub(crate) fn finish(mut self, outcome: FlowOutcome, reason: &str) -> Result<FlowReport, FlowError> {
        self.advance(FlowState::Done, reason)?;
        Ok(FlowReport {
            outcome,
            existence: self.existence,
            transitions: self.transitions,
        })
    }
}
