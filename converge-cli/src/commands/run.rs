//! `converge run` — drive a reconciliation to completion.
//!
//! Loops `reconcile` against the file-backed remote, sleeping for each
//! suspended outcome's resume delay and persisting the workflow context
//! between attempts so an interrupted run resumes where it left off.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use converge_engine::{reconcile, ReconcileStatus};

use crate::commands::resolve_home;
use crate::config;
use crate::context_store;
use crate::remote_file::FileRemote;

/// Arguments for `converge run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Desired configuration YAML.
    #[arg(long)]
    pub desired: PathBuf,

    /// Previously-applied configuration YAML.
    #[arg(long)]
    pub prior: PathBuf,

    /// Remote state YAML the harness reconciles against.
    #[arg(long)]
    pub remote: PathBuf,

    /// State directory root (defaults to the user home).
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Give up after this many invocations.
    #[arg(long, default_value_t = 25)]
    pub max_attempts: u32,

    /// Override the engine's resume delays (useful for local harnesses).
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let home = resolve_home(self.home.clone())?;
        let desired = config::load_config(&self.desired)?;
        let prior = config::load_config(&self.prior)?;
        let digest = context_store::desired_digest(&desired)
            .context("failed to digest desired configuration")?;

        let mut context = context_store::load_at(&home, &desired.id, &digest)
            .context("failed to load stored workflow context")?
            .unwrap_or_default();
        let mut remote = FileRemote::new(&self.remote);

        for attempt in 1..=self.max_attempts {
            tracing::info!(resource = %desired.id, attempt, phase = %context.phase, "invoking reconcile");
            let outcome = reconcile(&mut remote, &desired, &prior, context);

            match outcome.status {
                ReconcileStatus::Success => {
                    context_store::clear_at(&home, &desired.id)
                        .context("failed to clear stored context")?;
                    println!(
                        "{} {} converged after {attempt} attempt(s)",
                        "SUCCESS".green().bold(),
                        desired.id,
                    );
                    return Ok(());
                }
                ReconcileStatus::Failed => {
                    // A terminal failure invalidates the suspended attempt.
                    context_store::clear_at(&home, &desired.id)
                        .context("failed to clear stored context")?;
                    if let Some(error) = outcome.error {
                        println!(
                            "{} {} ({}): {error}",
                            "FAILED".red().bold(),
                            desired.id,
                            error.kind(),
                        );
                        bail!("reconciliation failed with kind {}", error.kind());
                    }
                    bail!("reconciliation failed");
                }
                ReconcileStatus::InProgress => {
                    context_store::save_at(&home, &desired.id, &digest, &outcome.context)
                        .context("failed to persist workflow context")?;
                    let delay = self
                        .poll_interval_secs
                        .map(Duration::from_secs)
                        .or(outcome.resume_delay)
                        .unwrap_or(Duration::from_secs(1));
                    println!(
                        "{} {} at {}, resuming in {}s",
                        "IN-PROGRESS".yellow(),
                        desired.id,
                        outcome.context.phase,
                        delay.as_secs(),
                    );
                    std::thread::sleep(delay);
                    context = outcome.context;
                }
            }
        }

        // Context stays persisted: a later `converge run` resumes from it.
        bail!(
            "did not converge within {} attempts; run again to resume",
            self.max_attempts
        );
    }
}
