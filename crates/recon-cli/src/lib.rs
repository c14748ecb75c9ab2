//! # recon-cli: Reconciliation Command Line
//!
//! Subcommand handlers for the `recon` binary. Each handler takes its clap
//! args plus the shared [`common::StoreArgs`] and returns an exit code.
//!
//! - `run`: drive the consent flow for an entitlement file.
//! - `key`: print the cache key an entitlement derives for a purpose.
//! - `inspect`: print the cached flags for an entitlement.

pub mod common;
pub mod inspect;
pub mod interactive;
pub mod key;
pub mod run;
