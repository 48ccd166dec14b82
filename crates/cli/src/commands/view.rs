// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether view`: one mapping in detail: both snapshots and the
//! recent audit trail.

use anyhow::{bail, Result};
use clap::Args;

use tether_core::NormalizedPayload;
use tether_storage::{OpStatus, Side};

use crate::color;
use crate::output::OutputFormat;

use super::open_context;

/// How many op-log entries to show.
const OPS_SHOWN: usize = 10;

#[derive(Args)]
pub struct ViewArgs {
    /// Task id or issue key
    pub id: String,
}

pub async fn handle(args: ViewArgs, format: OutputFormat) -> Result<()> {
    let (_root, ctx) = open_context(false)?;
    let store = ctx.store();

    let mapping = match store.get_mapping(&args.id)? {
        Some(mapping) => mapping,
        None => match store.get_mapping_by_remote_key(&args.id)? {
            Some(mapping) => mapping,
            None => bail!("no mapping for '{}'", args.id),
        },
    };

    let snap_local = store.get_snapshot(&mapping.local_id, Side::Local)?;
    let snap_remote = store.get_snapshot(&mapping.local_id, Side::Remote)?;
    let ops: Vec<_> = store
        .read_ops()?
        .into_iter()
        .filter(|op| {
            op.local_id == mapping.local_id
                || op.remote_key.as_deref() == Some(mapping.remote_key.as_str())
        })
        .collect();

    if let OutputFormat::Json = format {
        let obj = serde_json::json!({
            "mapping": mapping,
            "snapshots": {
                "local": snap_local,
                "remote": snap_remote,
            },
            "recentOps": ops.iter().rev().take(OPS_SHOWN).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!(
        "{}",
        color::header(&format!("{} <-> {}", mapping.local_id, mapping.remote_key))
    );
    println!("  mapped:  {}", mapping.created_at.to_rfc3339());
    println!("  updated: {}", mapping.updated_at.to_rfc3339());

    print_snapshot("Local snapshot", snap_local.as_ref().map(|s| &s.payload));
    print_snapshot("Remote snapshot", snap_remote.as_ref().map(|s| &s.payload));

    println!();
    println!("{}", color::header("Recent operations"));
    if ops.is_empty() {
        println!("  (none)");
    }
    for op in ops.iter().rev().take(OPS_SHOWN) {
        let status = match op.status {
            OpStatus::Ok => color::green("ok"),
            OpStatus::Failed => color::red("failed"),
        };
        let detail = op
            .detail
            .as_deref()
            .map(|d| format!(" - {}", d))
            .unwrap_or_default();
        println!(
            "  {}  {:<8} {}{}",
            color::muted(&op.timestamp.to_rfc3339()),
            op.operation.to_string(),
            status,
            color::muted(&detail),
        );
    }
    Ok(())
}

fn print_snapshot(label: &str, payload: Option<&NormalizedPayload>) {
    println!();
    println!("{}", color::header(label));
    let Some(payload) = payload else {
        println!("  (absent)");
        return;
    };
    println!("  title:    {}", payload.title);
    println!("  status:   {}", color::state(&payload.status));
    println!("  priority: {}", payload.priority);
    if !payload.labels.is_empty() {
        println!("  labels:   {}", payload.labels.join(", "));
    }
    if let Some(assignee) = &payload.assignee {
        println!("  assignee: {}", assignee);
    }
    if !payload.acceptance_criteria.is_empty() {
        let checked = payload
            .acceptance_criteria
            .iter()
            .filter(|ac| ac.checked)
            .count();
        println!(
            "  criteria: {}/{} checked",
            checked,
            payload.acceptance_criteria.len()
        );
    }
}
