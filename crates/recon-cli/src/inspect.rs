//! # Inspect Subcommand
//!
//! Reads both cached flags for an entitlement from the selected store.
//! Unlike the flow, store failures are reported instead of read as absent.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use recon_cache::ReconciliationCache;
use recon_core::{CachePurpose, Entitlement};

use crate::common::{load_entitlement, StoreArgs};

/// Arguments for `recon inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Entitlement JSON file.
    #[arg(long, short)]
    pub entitlement: PathBuf,
}

/// Execute `recon inspect`.
pub async fn run_inspect(args: &InspectArgs, store: &StoreArgs) -> Result<u8> {
    let entitlement = load_entitlement(&args.entitlement)?;
    for line in flag_lines(&store.cache(), &entitlement).await? {
        println!("{line}");
    }
    Ok(0)
}

async fn flag_lines(cache: &ReconciliationCache, entitlement: &Entitlement) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(CachePurpose::ALL.len());
    for purpose in CachePurpose::ALL {
        let value = cache
            .try_read(purpose, entitlement)
            .await
            .with_context(|| format!("reading {purpose}"))?;
        let shown = match value {
            Some(flag) => flag.to_string(),
            None => "unset".to_string(),
        };
        lines.push(format!("{purpose}: {shown}"));
    }
    Ok(lines)
}
