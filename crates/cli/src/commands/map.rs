// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether map`: establish task↔issue bindings.

use anyhow::Result;
use clap::{Args, Subcommand};

use tether_engine::{MapOutcome, Mapper};

use crate::color;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use crate::prompt::TerminalPicker;

use super::connect_engine;

#[derive(Args)]
pub struct MapArgs {
    #[command(subcommand)]
    pub command: MapCommand,
}

#[derive(Subcommand)]
pub enum MapCommand {
    /// Fuzzy-match unmapped tasks against remote issues by title
    Auto {
        /// Minimum similarity score to accept (0..1, default 0.7)
        #[arg(long)]
        min_score: Option<f64>,
        /// Show what would be bound without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Pick candidates interactively for each unmapped task
    Interactive {},
    /// Bind one task to one issue directly
    Link {
        /// Local task id
        local_id: String,
        /// Remote issue key (e.g. PROJ-123)
        remote_key: String,
        /// Replace existing bindings on either side
        #[arg(long)]
        force: bool,
        /// Validate only; write nothing
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle(args: MapArgs, _format: OutputFormat) -> Result<()> {
    match args.command {
        MapCommand::Auto { min_score, dry_run } => {
            let engine = connect_engine(dry_run).await?;
            let mapper = Mapper::new(
                engine.reconciler.local().clone(),
                engine.reconciler.remote().clone(),
                std::sync::Arc::clone(&engine.ctx),
            );
            let result = mapper.map_auto(min_score).await;
            engine.close().await;
            print_outcomes(&result?)
        }
        MapCommand::Interactive {} => {
            let engine = connect_engine(false).await?;
            let mapper = Mapper::new(
                engine.reconciler.local().clone(),
                engine.reconciler.remote().clone(),
                std::sync::Arc::clone(&engine.ctx),
            );
            let result = mapper.map_interactive(&TerminalPicker).await;
            engine.close().await;
            print_outcomes(&result?)
        }
        MapCommand::Link {
            local_id,
            remote_key,
            force,
            dry_run,
        } => {
            let engine = connect_engine(dry_run).await?;
            let mapper = Mapper::new(
                engine.reconciler.local().clone(),
                engine.reconciler.remote().clone(),
                std::sync::Arc::clone(&engine.ctx),
            );
            let result = mapper.map_link(&local_id, &remote_key, force).await;
            engine.close().await;
            result?;
            println!("Mapped {} <-> {}", local_id, remote_key);
            Ok(())
        }
    }
}

fn print_outcomes(outcomes: &[MapOutcome]) -> Result<()> {
    let mut mapped = 0;
    for outcome in outcomes {
        match outcome {
            MapOutcome::Mapped {
                local_id,
                remote_key,
                score,
            } => {
                mapped += 1;
                println!(
                    "  {} <-> {}  {}",
                    local_id,
                    remote_key,
                    color::green(&format!("mapped ({:.2})", score)),
                );
            }
            MapOutcome::NoMatch {
                local_id,
                best_score,
            } => {
                println!(
                    "  {}  {}",
                    local_id,
                    color::muted(&format!("no match (best {:.2})", best_score)),
                );
            }
            MapOutcome::Skipped { local_id } => {
                println!("  {}  {}", local_id, color::muted("skipped"));
            }
            MapOutcome::Aborted => {
                println!("  {}", color::yellow("aborted"));
                return Err(ExitError::silent().into());
            }
        }
    }
    println!("{}", color::muted(&format!("{} task(s) mapped", mapped)));
    Ok(())
}
