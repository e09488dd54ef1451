//! Subcommand implementations.

pub mod context;
pub mod plan;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolve the state home: an explicit `--home`, else the user's home dir.
pub(crate) fn resolve_home(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(home) => Ok(home),
        None => dirs::home_dir().context("could not determine home directory"),
    }
}
