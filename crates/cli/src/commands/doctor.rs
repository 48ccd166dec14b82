// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether doctor`: environment checks.

use anyhow::Result;
use clap::Args;

use tether_adapters::{Credentials, LocalAdapter};
use tether_core::{SyncConfig, TaskFilter};
use tether_storage::MappingStore;

use crate::color;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

use super::find_workspace_root;

#[derive(Args)]
pub struct DoctorArgs {}

fn check(label: &str, ok: bool, detail: &str) -> bool {
    let mark = if ok {
        color::green("ok")
    } else {
        color::red("FAIL")
    };
    println!("  {:<24} {}  {}", label, mark, color::muted(detail));
    ok
}

pub async fn handle(_args: DoctorArgs, _format: OutputFormat) -> Result<()> {
    let mut healthy = true;

    // Workspace state
    match find_workspace_root() {
        Some(root) => {
            check("workspace", true, &root.display().to_string());
            let store = MappingStore::open(&root)?;
            match SyncConfig::load(&store.config_path()) {
                Ok(config) => {
                    let detail = config
                        .project_key
                        .as_deref()
                        .map(|key| format!("project {}", key))
                        .unwrap_or_else(|| "no projectKey set".to_string());
                    check("config", true, &detail);
                }
                Err(e) => healthy &= check("config", false, &e.to_string()),
            }
        }
        None => {
            healthy &= check("workspace", false, "no .tether directory (run `tether init`)");
        }
    }

    // Local CLI
    let local = tether_adapters::CliLocalAdapter::new();
    match local.list_tasks(&TaskFilter::default()).await {
        Ok(tasks) => {
            check("task CLI", true, &format!("{} task(s)", tasks.len()));
        }
        Err(e) => healthy &= check("task CLI", false, &e.to_string()),
    }

    // Credentials
    match Credentials::from_env() {
        Ok(credentials) => {
            check("credentials", true, credentials.base_url());
        }
        Err(e) => healthy &= check("credentials", false, &e.to_string()),
    }

    if healthy {
        println!("{}", color::green("All checks passed."));
        Ok(())
    } else {
        Err(ExitError::silent().into())
    }
}
