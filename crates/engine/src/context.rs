// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state for one command invocation: the store, the config
//! document, and the post-success bookkeeping every operation performs
//! in the same order (snapshots, frontmatter, op log).

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::warn;

use tether_adapters::frontmatter::{self, FrontmatterError, SyncMetadata};
use tether_core::{payload_hash, NormalizedPayload, SyncConfig, SyncState, Task};
use tether_storage::{Mapping, MappingStore, OpLogEntry, OpStatus, Operation, Side, StoredSnapshot};

use crate::error::EngineError;

/// Per-invocation context shared by the reconciler, mapper, and watcher.
pub struct SyncContext {
    store: MappingStore,
    config: Mutex<SyncConfig>,
    workspace_root: PathBuf,
    remote_base_url: Option<String>,
    dry_run: bool,
}

impl SyncContext {
    pub fn new(store: MappingStore, config: SyncConfig, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            config: Mutex::new(config),
            workspace_root: workspace_root.into(),
            remote_base_url: None,
            dry_run: false,
        }
    }

    pub fn with_remote_base_url(mut self, url: impl Into<String>) -> Self {
        self.remote_base_url = Some(url.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// A point-in-time copy of the config. The document is immutable for
    /// the invocation except through [`SyncContext::update_config`].
    pub fn config(&self) -> SyncConfig {
        self.config.lock().clone()
    }

    /// Mutate and persist the config (strategy preference, discovered
    /// assignee mappings).
    pub fn update_config(
        &self,
        mutate: impl FnOnce(&mut SyncConfig),
    ) -> Result<(), EngineError> {
        let mut guard = self.config.lock();
        mutate(&mut guard);
        guard.save(&self.store.config_path())?;
        Ok(())
    }

    /// Browse URL for an issue, when the remote base URL is known.
    pub fn remote_url(&self, remote_key: &str) -> Option<String> {
        self.remote_base_url
            .as_ref()
            .map(|base| format!("{}/browse/{}", base.trim_end_matches('/'), remote_key))
    }

    /// Write both snapshots from the post-operation payloads. This is the
    /// step that establishes the new three-way base.
    pub fn write_snapshots(
        &self,
        local_id: &str,
        local_payload: &NormalizedPayload,
        remote_payload: &NormalizedPayload,
    ) -> Result<(), EngineError> {
        self.store.put_snapshot(&StoredSnapshot::new(
            local_id,
            Side::Local,
            payload_hash(local_payload),
            local_payload.clone(),
        ))?;
        self.store.put_snapshot(&StoredSnapshot::new(
            local_id,
            Side::Remote,
            payload_hash(remote_payload),
            remote_payload.clone(),
        ))?;
        Ok(())
    }

    fn frontmatter_path(&self, task: &Task) -> Option<PathBuf> {
        let rel = task.file_path.as_ref()?;
        let path = Path::new(rel);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        })
    }

    /// Update the engine-owned frontmatter keys for a synced task. A task
    /// whose file path is unknown is logged and skipped; frontmatter is
    /// an index, not the source of truth.
    pub fn update_frontmatter(
        &self,
        task: &Task,
        mapping: &Mapping,
        state: SyncState,
    ) -> Result<(), EngineError> {
        let Some(path) = self.frontmatter_path(task) else {
            warn!(
                local_id = %mapping.local_id,
                "task file path unknown, skipping frontmatter update",
            );
            return Ok(());
        };
        let meta = SyncMetadata {
            remote_key: Some(mapping.remote_key.clone()),
            remote_url: self.remote_url(&mapping.remote_key),
            last_sync: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            sync_state: Some(state.to_string()),
        };
        match frontmatter::write_sync_metadata(&path, &meta) {
            Ok(()) => Ok(()),
            // The metadata is an index into the store, not the source of
            // truth; a task file that moved is a warning, not a failure.
            Err(FrontmatterError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!(
                    local_id = %mapping.local_id,
                    path = %path.display(),
                    "task file missing, skipping frontmatter update",
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Clear the engine-owned frontmatter keys (unmap).
    pub fn clear_frontmatter(&self, task: &Task) -> Result<(), EngineError> {
        if let Some(path) = self.frontmatter_path(task) {
            match frontmatter::write_sync_metadata(&path, &SyncMetadata::default()) {
                Ok(()) => {}
                Err(FrontmatterError::Io { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn log_ok(
        &self,
        operation: Operation,
        local_id: &str,
        remote_key: Option<&str>,
        detail: Option<&str>,
    ) {
        let mut entry = OpLogEntry::ok(operation, local_id, remote_key.map(str::to_string));
        if let Some(detail) = detail {
            entry = entry.with_detail(detail);
        }
        self.append_op(entry);
    }

    pub fn log_failed(
        &self,
        operation: Operation,
        local_id: &str,
        remote_key: Option<&str>,
        detail: &str,
    ) {
        self.append_op(OpLogEntry::failed(
            operation,
            local_id,
            remote_key.map(str::to_string),
            detail,
        ));
    }

    /// Op-log appends are best-effort: a full disk must not turn a
    /// completed sync into a reported failure.
    fn append_op(&self, entry: OpLogEntry) {
        debug_assert!(entry.status == OpStatus::Ok || entry.detail.is_some());
        if let Err(e) = self.store.append_op(&entry) {
            warn!(error = %e, "failed to append op-log entry");
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
