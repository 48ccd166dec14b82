// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether unmap`: drop a binding. Runs offline; the remote issue is
//! left untouched.

use anyhow::Result;
use clap::Args;

use tether_adapters::CliLocalAdapter;
use tether_engine::unmap_task;

use crate::output::OutputFormat;

use super::open_context;

#[derive(Args)]
pub struct UnmapArgs {
    /// Local task id (or remote issue key)
    pub id: String,
    /// Validate only; write nothing
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle(args: UnmapArgs, _format: OutputFormat) -> Result<()> {
    let (_root, ctx) = open_context(args.dry_run)?;

    // Accept either side's identifier
    let local_id = match ctx.store().get_mapping(&args.id)? {
        Some(mapping) => mapping.local_id,
        None => match ctx.store().get_mapping_by_remote_key(&args.id)? {
            Some(mapping) => mapping.local_id,
            None => args.id.clone(),
        },
    };

    unmap_task(&CliLocalAdapter::new(), &ctx, &local_id).await?;
    if !args.dry_run {
        println!("Unmapped {}", local_id);
    }
    Ok(())
}
