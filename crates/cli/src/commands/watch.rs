// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tether watch`: poll and sync until interrupted.

use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::warn;

use tether_core::{config::parse_interval, ConflictStrategy};
use tether_engine::{WatchOptions, Watcher};

use crate::exit_error::ExitError;
use crate::output::OutputFormat;

use super::{connect_engine, selection};

/// Default poll interval when neither the flag nor the config sets one.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Args)]
pub struct WatchArgs {
    /// Task ids or issue keys to watch (default: every mapping)
    pub ids: Vec<String>,
    /// Poll interval (e.g. 60s, 5m, 1h); defaults to syncInterval from
    /// the config, then 60s
    #[arg(long)]
    pub interval: Option<String>,
    /// Unattended conflict strategy (prompt is not allowed here)
    #[arg(long)]
    pub strategy: Option<ConflictStrategy>,
    /// Exit after the first failing cycle
    #[arg(long)]
    pub stop_on_error: bool,
}

pub async fn handle(args: WatchArgs, _format: OutputFormat) -> Result<()> {
    let engine = connect_engine(false).await?;
    let config = engine.ctx.config();

    let interval = match args.interval.as_deref().or(config.sync_interval.as_deref()) {
        Some(spec) => parse_interval(spec)?,
        None => DEFAULT_INTERVAL,
    };

    // The config's interactive default cannot drive an unattended loop.
    let strategy = match args.strategy {
        Some(strategy) => strategy,
        None if config.conflict_strategy == ConflictStrategy::Prompt => {
            warn!("configured strategy 'prompt' is not usable in watch mode; using manual");
            ConflictStrategy::Manual
        }
        None => config.conflict_strategy,
    };

    let options = WatchOptions {
        interval,
        strategy,
        stop_on_error: args.stop_on_error,
        selection: selection(&args.ids).map(|ids| ids.to_vec()),
    };
    let watcher = Watcher::new(engine.reconciler.clone(), options)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    println!(
        "Watching {} mapping(s) every {:?} (strategy: {}; ctrl-c to stop)",
        engine.ctx.store().list_mappings().map(|m| m.len()).unwrap_or(0),
        interval,
        strategy,
    );

    let result = watcher.run(shutdown_rx).await;
    engine.close().await;
    let counters = result?;

    println!(
        "Watch summary: {} cycle(s), {} synced, {} conflict(s), {} error(s)",
        counters.cycles, counters.synced, counters.conflicts, counters.errors,
    );
    if args.stop_on_error && counters.errors > 0 {
        return Err(ExitError::silent().into());
    }
    Ok(())
}
