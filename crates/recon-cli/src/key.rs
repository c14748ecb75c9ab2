//! # Key Subcommand
//!
//! Prints the cache key an entitlement derives for a purpose. Useful for
//! locating entries in the JSON store by hand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use recon_core::{CachePurpose, Entitlement, KeyDeriver};

use crate::common::load_entitlement;

/// Which cached flag to derive a key for.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurposeArg {
    HasAccount,
    RejectedCreation,
}

impl From<PurposeArg> for CachePurpose {
    fn from(p: PurposeArg) -> Self {
        match p {
            PurposeArg::HasAccount => CachePurpose::HasAccount,
            PurposeArg::RejectedCreation => CachePurpose::RejectedCreation,
        }
    }
}

/// Arguments for `recon key`.
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Entitlement JSON file.
    #[arg(long, short)]
    pub entitlement: PathBuf,

    /// Purpose to derive for. Prints both when omitted.
    #[arg(long, value_enum)]
    pub purpose: Option<PurposeArg>,
}

/// Execute `recon key`.
pub fn run_key(args: &KeyArgs) -> Result<u8> {
    let entitlement = load_entitlement(&args.entitlement)?;
    for line in key_lines(&KeyDeriver::default(), &entitlement, args.purpose)? {
        println!("{line}");
    }
    Ok(0)
}

fn key_lines(
    keys: &KeyDeriver,
    entitlement: &Entitlement,
    purpose: Option<PurposeArg>,
) -> Result<Vec<String>> {
    let purposes: Vec<CachePurpose> = match purpose {
        Some(p) => vec![p.into()],
        None => CachePurpose::ALL.to_vec(),
    };
    purposes
        .into_iter()
        .map(|p| {
            keys.derive_key(p, entitlement)
                .map(|k| k.into_string())
                .with_context(|| format!("deriving {p} key"))
        })
        .collect()
}
