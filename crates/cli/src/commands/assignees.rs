// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether map-assignees`: manage local↔remote user mappings.
//!
//! Explicit entries always shadow auto-discovered ones; `promote` moves
//! a discovered entry into the explicit set.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Select};

use tether_adapters::{CliLocalAdapter, LocalAdapter, RemoteAdapter};
use tether_core::TaskFilter;

use crate::color;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

use super::{connect_engine, open_context};

#[derive(Args)]
pub struct AssigneesArgs {
    #[command(subcommand)]
    pub command: AssigneesCommand,
}

#[derive(Subcommand)]
pub enum AssigneesCommand {
    /// List explicit and auto-discovered assignee mappings
    Show {},
    /// Add an explicit mapping
    Add {
        /// Local assignee (as it appears in tasks, @ optional)
        local: String,
        /// Remote user identifier (email or account id)
        remote: String,
    },
    /// Remove a mapping (explicit or auto-discovered)
    Remove {
        /// Local assignee
        local: String,
    },
    /// Promote an auto-discovered mapping to an explicit one
    Promote {
        /// Local assignee
        local: String,
    },
    /// Search the remote for each unmapped local assignee and pick
    Interactive {},
}

fn normalize_local_user(name: &str) -> String {
    name.trim().trim_start_matches('@').to_lowercase()
}

pub async fn handle(args: AssigneesArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        AssigneesCommand::Show {} => show(format),
        AssigneesCommand::Add { local, remote } => {
            let (_root, ctx) = open_context(false)?;
            let local = normalize_local_user(&local);
            ctx.update_config(|config| {
                config.assignee_mapping.insert(local.clone(), remote.clone());
                // An explicit entry supersedes any discovered one
                config.auto_mapped_assignees.remove(&local);
            })?;
            println!("Mapped {} -> {}", local, remote);
            Ok(())
        }
        AssigneesCommand::Remove { local } => {
            let (_root, ctx) = open_context(false)?;
            let local = normalize_local_user(&local);
            let mut removed = false;
            ctx.update_config(|config| {
                removed = config.assignee_mapping.remove(&local).is_some()
                    || config.auto_mapped_assignees.remove(&local).is_some();
            })?;
            if !removed {
                bail!("no assignee mapping for '{}'", local);
            }
            println!("Removed mapping for {}", local);
            Ok(())
        }
        AssigneesCommand::Promote { local } => {
            let (_root, ctx) = open_context(false)?;
            let local = normalize_local_user(&local);
            let mut promoted = None;
            ctx.update_config(|config| {
                if let Some(remote) = config.auto_mapped_assignees.remove(&local) {
                    config.assignee_mapping.insert(local.clone(), remote.clone());
                    promoted = Some(remote);
                }
            })?;
            match promoted {
                Some(remote) => {
                    println!("Promoted {} -> {} to an explicit mapping", local, remote);
                    Ok(())
                }
                None => bail!("no auto-discovered mapping for '{}'", local),
            }
        }
        AssigneesCommand::Interactive {} => interactive().await,
    }
}

fn show(format: OutputFormat) -> Result<()> {
    let (_root, ctx) = open_context(false)?;
    let config = ctx.config();

    if let OutputFormat::Json = format {
        let obj = serde_json::json!({
            "explicit": config.assignee_mapping,
            "autoMapped": config.auto_mapped_assignees,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    if config.assignee_mapping.is_empty() && config.auto_mapped_assignees.is_empty() {
        println!("No assignee mappings. Use `tether map-assignees add` or run an import.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::plain("LOCAL"),
        Column::plain("REMOTE"),
        Column::muted("SOURCE"),
    ]);
    let mut explicit: Vec<_> = config.assignee_mapping.iter().collect();
    explicit.sort();
    for (local, remote) in explicit {
        table.row(vec![local.clone(), remote.clone(), "explicit".to_string()]);
    }
    let mut auto: Vec<_> = config.auto_mapped_assignees.iter().collect();
    auto.sort();
    for (local, remote) in auto {
        // Shadowed entries are dead weight; mark them
        let source = if config.assignee_mapping.contains_key(local) {
            "auto (shadowed)".to_string()
        } else {
            "auto".to_string()
        };
        table.row(vec![local.clone(), remote.clone(), source]);
    }
    print!("{}", table.render());
    Ok(())
}

/// Distinct local assignees without any mapping yet.
async fn unmapped_local_assignees(
    local: &CliLocalAdapter,
    ctx: &tether_engine::SyncContext,
) -> Result<Vec<String>> {
    let tasks = local.list_tasks(&TaskFilter::default()).await?;
    let config = ctx.config();
    let mut names = Vec::new();
    for task in tasks {
        let Some(assignee) = task.assignee else {
            continue;
        };
        let name = normalize_local_user(&assignee);
        if name.is_empty() || names.contains(&name) {
            continue;
        }
        if config.remote_assignee_for(&name).is_some() {
            continue;
        }
        names.push(name);
    }
    Ok(names)
}

async fn interactive() -> Result<()> {
    let engine = connect_engine(false).await?;
    let local = CliLocalAdapter::new();

    let names = unmapped_local_assignees(&local, &engine.ctx).await?;
    if names.is_empty() {
        println!("Every local assignee already has a mapping.");
        engine.close().await;
        return Ok(());
    }

    for name in names {
        let users = engine.reconciler.remote().search_users(&name).await?;
        if users.is_empty() {
            println!("  {}  {}", name, color::muted("no remote users found"));
            continue;
        }

        let mut items: Vec<String> = users
            .iter()
            .map(|u| format!("{} ({})", u.display_name, u.identifier))
            .collect();
        items.push("skip".to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remote user for '{}'", name))
            .items(&items)
            .default(0)
            .interact_opt();

        match selection {
            Ok(Some(index)) if index < users.len() => {
                let remote = users[index].identifier.clone();
                engine.ctx.update_config(|config| {
                    config.assignee_mapping.insert(name.clone(), remote.clone());
                    config.auto_mapped_assignees.remove(&name);
                })?;
                println!("  {}", color::green(&format!("{} -> {}", name, remote)));
            }
            Ok(_) => continue,
            Err(_) => break,
        }
    }

    engine.close().await;
    Ok(())
}
