// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether init`: scaffold the workspace state directory.

use anyhow::Result;
use clap::Args;

use tether_core::SyncConfig;
use tether_storage::MappingStore;

use crate::output::OutputFormat;

#[derive(Args)]
pub struct InitArgs {
    /// Default remote project key (e.g. PROJ)
    #[arg(long)]
    pub project: Option<String>,
    /// JQL filter scoping import and watch
    #[arg(long)]
    pub jql: Option<String>,
}

pub fn handle(args: InitArgs, _format: OutputFormat) -> Result<()> {
    let root = std::env::current_dir()?;
    let store = MappingStore::open(&root)?;

    let config_path = store.config_path();
    if config_path.exists() {
        // Re-running init only fills in the flags, never resets config
        if args.project.is_some() || args.jql.is_some() {
            let mut config = SyncConfig::load(&config_path)?;
            if let Some(project) = args.project {
                config.project_key = Some(project);
            }
            if let Some(jql) = args.jql {
                config.jql_filter = Some(jql);
            }
            config.save(&config_path)?;
            println!("Updated {}", config_path.display());
        } else {
            println!("Already initialized at {}", store.root().display());
        }
        return Ok(());
    }

    let config = SyncConfig {
        project_key: args.project,
        jql_filter: args.jql,
        ..SyncConfig::default()
    };
    config.save(&config_path)?;

    println!("Initialized {}", store.root().display());
    println!("  config:    {}", config_path.display());
    println!("  mappings:  {}", store.root().join("mappings").display());
    println!("  snapshots: {}", store.root().join("snapshots").display());
    println!();
    println!("Next: set BASE_URL and credentials, then `tether doctor`.");
    Ok(())
}
