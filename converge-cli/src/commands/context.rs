//! `converge context` — inspect or reset a persisted workflow context.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use converge_core::ResourceId;

use crate::commands::resolve_home;
use crate::context_store;

#[derive(Subcommand, Debug)]
pub enum ContextCommand {
    /// Print the stored context for a resource.
    Show {
        /// Resource identifier.
        id: String,

        /// State directory root (defaults to the user home).
        #[arg(long)]
        home: Option<PathBuf>,
    },

    /// Remove the stored context for a resource.
    Clear {
        /// Resource identifier.
        id: String,

        /// State directory root (defaults to the user home).
        #[arg(long)]
        home: Option<PathBuf>,
    },
}

impl ContextCommand {
    pub fn run(self) -> Result<()> {
        match self {
            ContextCommand::Show { id, home } => {
                let home = resolve_home(home)?;
                let id = ResourceId::from(id);
                match context_store::read_at(&home, &id)
                    .context("failed to read stored context")?
                {
                    None => println!("no stored context for {id}"),
                    Some(file) => {
                        println!(
                            "{} saved_at={} phase={} reboot_signaled={}",
                            id.to_string().bold(),
                            file.saved_at,
                            file.context.phase,
                            file.context.reboot_signaled,
                        );
                        println!("{}", serde_json::to_string_pretty(&file)?);
                    }
                }
                Ok(())
            }
            ContextCommand::Clear { id, home } => {
                let home = resolve_home(home)?;
                let id = ResourceId::from(id);
                let removed = context_store::clear_at(&home, &id)
                    .context("failed to clear stored context")?;
                if removed {
                    println!("cleared stored context for {id}");
                } else {
                    println!("no stored context for {id}");
                }
                Ok(())
            }
        }
    }
}
