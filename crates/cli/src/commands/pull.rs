// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether pull`: apply remote changes to local tasks, importing
//! unmapped issues on a full pull.

use anyhow::Result;
use clap::Args;

use crate::output::{print_report, OutputFormat};

use super::{connect_engine, report_exit, selection};

#[derive(Args)]
pub struct PullArgs {
    /// Task ids or issue keys to pull (default: every mapping, plus
    /// import of unmapped issues matching the JQL filter)
    pub ids: Vec<String>,
    /// Show what would change without touching either side
    #[arg(long)]
    pub dry_run: bool,
    /// Pull even when local changed or both sides conflict
    #[arg(long)]
    pub force: bool,
}

pub async fn handle(args: PullArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let engine = connect_engine(args.dry_run).await?;
    let result = engine
        .reconciler
        .pull(selection(&args.ids), args.force)
        .await;
    engine.close().await;

    let report = result?;
    print_report(&report, format, verbose);
    report_exit(&report)
}
