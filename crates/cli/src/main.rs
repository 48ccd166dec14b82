// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether - keep markdown tasks and a remote issue tracker in sync

mod color;
mod commands;
mod exit_error;
mod output;
mod prompt;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{
    assignees, create_issue, doctor, init, map, pull, push, status, sync, unmap, view, watch,
};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "tether",
    version,
    about = "Tether - bidirectional sync between markdown tasks and an issue tracker",
    styles = color::styles()
)]
struct Cli {
    /// Change to <dir> before doing anything
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Verbose output (debug logging, per-mapping no-op lines)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold the workspace state directory
    Init(init::InitArgs),
    /// Establish task<->issue bindings
    Map(map::MapArgs),
    /// Manage assignee mappings
    #[command(name = "map-assignees")]
    MapAssignees(assignees::AssigneesArgs),
    /// Apply local changes to the remote tracker
    Push(push::PushArgs),
    /// Apply remote changes to local tasks (and import new issues)
    Pull(pull::PullArgs),
    /// Bidirectional sync with conflict resolution
    Sync(sync::SyncArgs),
    /// Poll and sync until interrupted
    Watch(watch::WatchArgs),
    /// Overview of every mapping
    Status(status::StatusArgs),
    /// One mapping in detail
    View(view::ViewArgs),
    /// Create a remote issue for an unmapped task
    #[command(name = "create-issue")]
    CreateIssue(create_issue::CreateIssueArgs),
    /// Drop a binding (leaves the remote issue alone)
    Unmap(unmap::UnmapArgs),
    /// Check the environment (task CLI, credentials, workspace)
    Doctor(doctor::DoctorArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
/// Otherwise we render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    // Walk the source chain; if every source message already appears
    // in the top-level string, the chain is redundant.
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    // Non-redundant chain — render like anyhow's Debug.
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

/// Initialize tracing once: `--verbose` wins, then `LOG_LEVEL`, then
/// warnings only. Logs go to stderr so command output stays parseable.
fn init_tracing(verbose: bool) {
    let directive = if verbose {
        "debug".to_string()
    } else {
        std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Apply -C: change working directory early, before workspace
    // discovery
    if let Some(ref dir) = cli.directory {
        let canonical = std::fs::canonicalize(dir).map_err(|e| {
            anyhow::anyhow!("cannot change to directory '{}': {}", dir.display(), e)
        })?;
        std::env::set_current_dir(&canonical).map_err(|e| {
            anyhow::anyhow!(
                "cannot change to directory '{}': {}",
                canonical.display(),
                e
            )
        })?;
    }

    let format = cli.output;
    match cli.command {
        Commands::Init(args) => init::handle(args, format),
        Commands::Map(args) => map::handle(args, format).await,
        Commands::MapAssignees(args) => assignees::handle(args, format).await,
        Commands::Push(args) => push::handle(args, format, cli.verbose).await,
        Commands::Pull(args) => pull::handle(args, format, cli.verbose).await,
        Commands::Sync(args) => sync::handle(args, format, cli.verbose).await,
        Commands::Watch(args) => watch::handle(args, format).await,
        Commands::Status(args) => status::handle(args, format).await,
        Commands::View(args) => view::handle(args, format).await,
        Commands::CreateIssue(args) => create_issue::handle(args, format).await,
        Commands::Unmap(args) => unmap::handle(args, format).await,
        Commands::Doctor(args) => doctor::handle(args, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
