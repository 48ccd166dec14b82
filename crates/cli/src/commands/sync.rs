// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether sync`: bidirectional reconciliation.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use tether_core::ConflictStrategy;

use crate::output::{print_report, OutputFormat};
use crate::prompt::TerminalPrompter;

use super::{connect_engine, report_exit, selection};

#[derive(Args)]
pub struct SyncArgs {
    /// Task ids or issue keys to sync (default: every mapping)
    pub ids: Vec<String>,
    /// Show what would change without touching either side
    #[arg(long)]
    pub dry_run: bool,
    /// Conflict strategy override (prefer-local, prefer-remote, prompt,
    /// manual)
    #[arg(long)]
    pub strategy: Option<ConflictStrategy>,
}

pub async fn handle(args: SyncArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let engine = connect_engine(args.dry_run).await?;
    let result = engine
        .reconciler
        .sync(
            selection(&args.ids),
            args.strategy,
            Some(Arc::new(TerminalPrompter)),
        )
        .await;
    engine.close().await;

    let report = result?;
    print_report(&report, format, verbose);
    report_exit(&report)
}
