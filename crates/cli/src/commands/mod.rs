// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers and their shared wiring.

pub mod assignees;
pub mod create_issue;
pub mod doctor;
pub mod init;
pub mod map;
pub mod pull;
pub mod push;
pub mod status;
pub mod sync;
pub mod unmap;
pub mod view;
pub mod watch;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::Arc;

use tether_adapters::{
    CliLocalAdapter, Credentials, RemoteAdapter, ToolServerAdapter, ToolServerConfig,
};
use tether_core::SyncConfig;
use tether_engine::{Reconciler, SyncContext, SyncReport};
use tether_storage::{MappingStore, STATE_DIR};

use crate::exit_error::ExitError;

/// Find the workspace root by walking up from the current directory,
/// looking for the state directory.
pub fn find_workspace_root() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;
    loop {
        if current.join(STATE_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// The workspace root for commands that need existing state.
pub fn require_initialized() -> Result<PathBuf> {
    match find_workspace_root() {
        Some(root) => Ok(root),
        None => bail!("no {} directory found (run `tether init` first)", STATE_DIR),
    }
}

/// Offline context: store + config, no remote connection.
pub fn open_context(dry_run: bool) -> Result<(PathBuf, Arc<SyncContext>)> {
    let root = require_initialized()?;
    let store = MappingStore::open(&root)?;
    let config = SyncConfig::load(&store.config_path())?;
    let ctx = Arc::new(SyncContext::new(store, config, &root).with_dry_run(dry_run));
    Ok((root, ctx))
}

/// A fully-connected engine: local CLI adapter plus a live tool-server
/// subprocess. Call [`EngineHandle::close`] before returning so the
/// child is torn down cleanly.
pub struct EngineHandle {
    pub reconciler: Reconciler<CliLocalAdapter, ToolServerAdapter>,
    pub ctx: Arc<SyncContext>,
    remote: ToolServerAdapter,
}

impl EngineHandle {
    pub async fn close(&self) {
        if let Err(e) = self.remote.close().await {
            tracing::warn!(error = %e, "tool server shutdown failed");
        }
    }
}

pub async fn connect_engine(dry_run: bool) -> Result<EngineHandle> {
    let root = require_initialized()?;
    let store = MappingStore::open(&root)?;
    let config = SyncConfig::load(&store.config_path())?;

    let credentials = Credentials::from_env()?;
    let remote = ToolServerAdapter::new(
        ToolServerConfig::from_sync_config(&config),
        credentials.clone(),
    );
    remote.connect().await?;

    let ctx = Arc::new(
        SyncContext::new(store, config, &root)
            .with_remote_base_url(credentials.base_url())
            .with_dry_run(dry_run),
    );
    let local = CliLocalAdapter::new();
    let reconciler = Reconciler::new(local, remote.clone(), Arc::clone(&ctx));

    Ok(EngineHandle {
        reconciler,
        ctx,
        remote,
    })
}

/// Exit 1 when any mapping failed; the per-mapping lines were already
/// printed.
pub fn report_exit(report: &SyncReport) -> Result<()> {
    if report.error_count() > 0 {
        return Err(ExitError::silent().into());
    }
    Ok(())
}

/// Turn a non-empty id list into a selection.
pub fn selection(ids: &[String]) -> Option<&[String]> {
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}
