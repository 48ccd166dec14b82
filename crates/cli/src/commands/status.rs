// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether status`: overview of every mapping, offline.
//!
//! Status reads the store and the local side only; it does not spawn
//! the tool server. Remote drift shows up on the next sync.

use anyhow::Result;
use clap::Args;

use tether_adapters::{CliLocalAdapter, LocalAdapter};
use tether_core::{normalize_local, payload_hash};
use tether_storage::Side;

use crate::output::{format_time_ago, OutputFormat};
use crate::table::{Column, Table};

use super::open_context;

#[derive(Args)]
pub struct StatusArgs {}

pub async fn handle(_args: StatusArgs, format: OutputFormat) -> Result<()> {
    let (_root, ctx) = open_context(false)?;
    let mappings = ctx.store().list_mappings()?;
    let local = CliLocalAdapter::new();

    let mut rows = Vec::new();
    for mapping in &mappings {
        let snapshot = ctx.store().get_snapshot(&mapping.local_id, Side::Local)?;
        let last_sync = snapshot
            .as_ref()
            .map(|s| format_time_ago(s.updated_at))
            .unwrap_or_else(|| "never".to_string());

        // Local drift check: current hash against the base snapshot.
        let local_changes = match (&snapshot, local.get_task(&mapping.local_id).await) {
            (Some(snapshot), Ok(task)) => {
                if payload_hash(&normalize_local(&task)) == snapshot.hash {
                    "-".to_string()
                } else {
                    "yes".to_string()
                }
            }
            (None, Ok(_)) => "unknown".to_string(),
            (_, Err(_)) => "?".to_string(),
        };

        rows.push((
            mapping.local_id.clone(),
            mapping.remote_key.clone(),
            last_sync,
            local_changes,
        ));
    }

    match format {
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = rows
                .iter()
                .map(|(local_id, remote_key, last_sync, local_changes)| {
                    serde_json::json!({
                        "localId": local_id,
                        "remoteKey": remote_key,
                        "lastSync": last_sync,
                        "localChanges": local_changes,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No mappings. Run `tether map` or `tether pull` to create some.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::plain("LOCAL"),
                Column::plain("REMOTE"),
                Column::muted("LAST SYNC"),
                Column::state("LOCAL CHANGES"),
            ]);
            for (local_id, remote_key, last_sync, local_changes) in rows {
                table.row(vec![local_id, remote_key, last_sync, local_changes]);
            }
            print!("{}", table.render());
        }
    }
    Ok(())
}
