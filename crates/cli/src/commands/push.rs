// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether push`: apply local changes to the remote tracker.

use anyhow::Result;
use clap::Args;

use crate::output::{print_report, OutputFormat};

use super::{connect_engine, report_exit, selection};

#[derive(Args)]
pub struct PushArgs {
    /// Task ids or issue keys to push (default: every mapping)
    pub ids: Vec<String>,
    /// Show what would change without touching either side
    #[arg(long)]
    pub dry_run: bool,
    /// Push even when the remote changed or the state is unknown
    #[arg(long)]
    pub force: bool,
}

pub async fn handle(args: PushArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let engine = connect_engine(args.dry_run).await?;
    let result = engine
        .reconciler
        .push(selection(&args.ids), args.force)
        .await;
    engine.close().await;

    let report = result?;
    print_report(&report, format, verbose);
    report_exit(&report)
}
