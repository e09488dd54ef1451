//! `converge plan` — dry-run step evaluation and config diff.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use similar::TextDiff;
use tabled::{settings::Style, Table, Tabled};

use converge_engine::{plan, PlanDecision};

use crate::config;

/// Arguments for `converge plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Desired configuration YAML.
    #[arg(long)]
    pub desired: PathBuf,

    /// Previously-applied configuration YAML.
    #[arg(long)]
    pub prior: PathBuf,

    /// Observed status snapshot YAML; without it, guards that need live
    /// state report "unknown".
    #[arg(long)]
    pub observed: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "STEP")]
    step: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

#[derive(Serialize)]
struct PlanRowJson {
    step: String,
    action: String,
    detail: String,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let desired = config::load_config(&self.desired)?;
        let prior = config::load_config(&self.prior)?;
        let observed = self.observed.as_deref().map(config::load_snapshot).transpose()?;

        let steps = plan(&desired, &prior, observed.as_ref());

        if self.json {
            let rows: Vec<PlanRowJson> = steps
                .iter()
                .map(|row| {
                    let (action, detail) = describe(&row.decision);
                    PlanRowJson {
                        step: row.step.to_string(),
                        action: action.to_string(),
                        detail,
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        let rows: Vec<PlanRow> = steps
            .iter()
            .map(|row| {
                let (action, detail) = describe(&row.decision);
                let action = match row.decision {
                    PlanDecision::Fires { .. } => action.green().to_string(),
                    PlanDecision::Skips => action.dimmed().to_string(),
                    PlanDecision::Unknown => action.yellow().to_string(),
                };
                PlanRow {
                    step: row.step.to_string(),
                    action,
                    detail,
                }
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        print_config_diff(&prior, &desired)?;
        Ok(())
    }
}

fn describe(decision: &PlanDecision) -> (&'static str, String) {
    match decision {
        PlanDecision::Fires { detail } => ("fires", detail.clone()),
        PlanDecision::Skips => ("skips", String::new()),
        PlanDecision::Unknown => ("unknown", "needs --observed".to_string()),
    }
}

/// Unified diff of prior vs desired configuration, rendered as YAML.
fn print_config_diff(
    prior: &converge_core::ResourceConfig,
    desired: &converge_core::ResourceConfig,
) -> Result<()> {
    let prior_yaml = serde_yaml::to_string(prior)?;
    let desired_yaml = serde_yaml::to_string(desired)?;
    if prior_yaml == desired_yaml {
        println!("{}", "configs are identical".dimmed());
        return Ok(());
    }
    let unified = TextDiff::from_lines(&prior_yaml, &desired_yaml)
        .unified_diff()
        .header("a/prior", "b/desired")
        .context_radius(3)
        .to_string();
    println!("{unified}");
    Ok(())
}
