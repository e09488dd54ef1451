//! Converge — reconcile a remote resource toward a desired configuration.
//!
//! # Usage
//!
//! ```text
//! converge plan --desired <yaml> --prior <yaml> [--observed <yaml>] [--json]
//! converge run --desired <yaml> --prior <yaml> --remote <yaml>
//!              [--home <dir>] [--max-attempts N] [--poll-interval-secs N]
//! converge context show <id> [--home <dir>]
//! converge context clear <id> [--home <dir>]
//! ```

mod commands;
mod config;
mod context_store;
mod remote_file;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{context::ContextCommand, plan::PlanArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(
    name = "converge",
    version,
    about = "Reconcile remote resource state against a desired configuration",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which pipeline steps would fire, without any remote call.
    Plan(PlanArgs),

    /// Drive a reconciliation to completion against a remote state file.
    Run(RunArgs),

    /// Inspect or reset the persisted workflow context for a resource.
    Context {
        #[command(subcommand)]
        command: ContextCommand,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan(args) => args.run(),
        Commands::Run(args) => args.run(),
        Commands::Context { command } => command.run(),
    }
}
