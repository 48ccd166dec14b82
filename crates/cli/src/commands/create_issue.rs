// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether create-issue`: push one unmapped task as a new remote
//! issue and bind it.

use anyhow::Result;
use clap::Args;

use crate::output::OutputFormat;

use super::connect_engine;

#[derive(Args)]
pub struct CreateIssueArgs {
    /// Local task id
    pub local_id: String,
    /// Show what would be created without calling the tracker
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle(args: CreateIssueArgs, _format: OutputFormat) -> Result<()> {
    let engine = connect_engine(args.dry_run).await?;
    let result = engine.reconciler.create_remote_issue(&args.local_id).await;
    engine.close().await;

    let remote_key = result?;
    if args.dry_run {
        println!("{}", remote_key);
    } else {
        println!("Created {} for {}", remote_key, args.local_id);
    }
    Ok(())
}
