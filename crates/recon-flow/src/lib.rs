//! # recon-flow: Deferred Account Reconciliation
//!
//! Given an entitlement issued by one platform, decide whether the publisher
//! already holds a matching account and, if not, ask the reader whether one
//! should be created.
//!
//! ## Components
//!
//! - **Existence** (`existence.rs`): [`AccountExistenceChecker`] consults the
//!   `HAS_ACCOUNT` cache entry first and only calls the publisher endpoint
//!   on a miss, writing the answer back.
//!
//! - **State** (`state.rs`): [`FlowState`] and the transition log. The
//!   allowed edges are
//!   `Start → CheckRejection → CheckExistence → AwaitConsent →
//!   {Redirecting | RecordingRejection} → Done`, with early exits to `Done`
//!   after `CheckRejection` and `CheckExistence`.
//!
//! - **Orchestrator** (`orchestrator.rs`): [`ConsentOrchestrator`] drives one
//!   run through the state machine.
//!
//! ## Failure Policy
//!
//! Storage failures never escape: they read as "no stored value" and writes
//! become no-ops. An existence check failure stops the run before the reader
//! is prompted. Consent and navigation failures belong to those collaborators
//! and are passed through.

pub mod collaborators;
pub mod error;
pub mod existence;
pub mod orchestrator;
pub mod state;

pub use collaborators::{ConsentError, ConsentPrompt, NavigationError, Navigator};
pub use error::{ExistenceCheckError, FlowError};
pub use existence::{AccountExistence, AccountExistenceChecker, ExistenceResult, ResultSource};
pub use orchestrator::ConsentOrchestrator;
pub use state::{FlowOutcome, FlowReport, FlowState, FlowTransitionRecord, ReconciliationOutcome};
