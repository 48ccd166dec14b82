// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mapping store: one JSON file per mapping, one per snapshot side.
//!
//! All writes are write-to-temp-then-rename so a crash never leaves a
//! half-written file. Corrupt files are rotated to `.bak` and reported as
//! absent; the reconciler rebuilds them on the next successful sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use tether_core::NormalizedPayload;

use crate::oplog::{OpLog, OpLogEntry};

/// Name of the workspace-scoped state directory.
pub const STATE_DIR: &str = ".tether";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which side of a mapping a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Local,
    Remote,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Local => "local",
            Side::Remote => "remote",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task↔issue binding. Exactly one per bound pair; each side
/// participates in at most one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub local_id: String,
    pub remote_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mapping {
    pub fn new(local_id: impl Into<String>, remote_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            local_id: local_id.into(),
            remote_key: remote_key.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The canonical payload last observed for one side of a mapping. Its
/// hash is the base for three-way comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub local_id: String,
    pub side: Side,
    pub hash: String,
    pub payload: NormalizedPayload,
    pub updated_at: DateTime<Utc>,
}

impl StoredSnapshot {
    pub fn new(local_id: impl Into<String>, side: Side, hash: impl Into<String>, payload: NormalizedPayload) -> Self {
        Self {
            local_id: local_id.into(),
            side,
            hash: hash.into(),
            payload,
            updated_at: Utc::now(),
        }
    }
}

/// File-backed store under `<workspace>/.tether/`.
///
/// Single-process access only; cross-process coordination is out of
/// scope. The store does not enforce snapshot pairing — a missing
/// snapshot is absence, and the classifier turns absence into Unknown.
pub struct MappingStore {
    root: PathBuf,
    oplog: OpLog,
}

impl MappingStore {
    /// Open the store under a workspace root, creating the layout
    /// (directories and `.gitignore`) if it does not exist yet.
    pub fn open(workspace_root: &Path) -> Result<Self, StoreError> {
        let root = workspace_root.join(STATE_DIR);
        fs::create_dir_all(root.join("mappings"))?;
        fs::create_dir_all(root.join("snapshots"))?;

        let gitignore = root.join(".gitignore");
        if !gitignore.exists() {
            fs::write(
                &gitignore,
                "# Machine-local sync state\nsnapshots/\nops-log.jsonl\n*.tmp\n*.bak*\n",
            )?;
        }

        let oplog = OpLog::open(root.join("ops-log.jsonl"));
        Ok(Self { root, oplog })
    }

    /// The state directory itself (`<workspace>/.tether`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the authoritative config document.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    fn mapping_path(&self, local_id: &str) -> PathBuf {
        self.root
            .join("mappings")
            .join(format!("{}.json", file_stem(local_id)))
    }

    fn snapshot_path(&self, local_id: &str, side: Side) -> PathBuf {
        self.root
            .join("snapshots")
            .join(format!("{}.{}.json", file_stem(local_id), side))
    }

    pub fn get_mapping(&self, local_id: &str) -> Result<Option<Mapping>, StoreError> {
        load_json(&self.mapping_path(local_id))
    }

    /// Reverse lookup by remote key. Scans the mapping directory; the
    /// mapping count is small (one file per bound task).
    pub fn get_mapping_by_remote_key(
        &self,
        remote_key: &str,
    ) -> Result<Option<Mapping>, StoreError> {
        Ok(self
            .list_mappings()?
            .into_iter()
            .find(|m| m.remote_key == remote_key))
    }

    pub fn put_mapping(&self, mapping: &Mapping) -> Result<(), StoreError> {
        save_json(&self.mapping_path(&mapping.local_id), mapping)
    }

    /// Remove a mapping and both of its snapshots.
    pub fn delete_mapping(&self, local_id: &str) -> Result<(), StoreError> {
        remove_if_exists(&self.mapping_path(local_id))?;
        remove_if_exists(&self.snapshot_path(local_id, Side::Local))?;
        remove_if_exists(&self.snapshot_path(local_id, Side::Remote))?;
        Ok(())
    }

    pub fn list_mappings(&self) -> Result<Vec<Mapping>, StoreError> {
        let dir = self.root.join("mappings");
        let mut mappings = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(mapping) = load_json::<Mapping>(&path)? {
                mappings.push(mapping);
            }
        }
        mappings.sort_by(|a, b| a.local_id.cmp(&b.local_id));
        Ok(mappings)
    }

    pub fn get_snapshot(
        &self,
        local_id: &str,
        side: Side,
    ) -> Result<Option<StoredSnapshot>, StoreError> {
        load_json(&self.snapshot_path(local_id, side))
    }

    pub fn put_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), StoreError> {
        save_json(
            &self.snapshot_path(&snapshot.local_id, snapshot.side),
            snapshot,
        )
    }

    /// Append an entry to the operations audit log.
    pub fn append_op(&self, entry: &OpLogEntry) -> Result<(), StoreError> {
        self.oplog.append(entry)
    }

    /// Read the audit log, oldest first. Corrupt lines are skipped.
    pub fn read_ops(&self) -> Result<Vec<OpLogEntry>, StoreError> {
        self.oplog.read_all()
    }
}

/// Turn an identifier into a path-safe file stem.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Save a value atomically (write to .tmp, sync, then rename).
fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load a value if the file exists.
///
/// Returns `Ok(None)` when the file is missing or corrupt. Corrupt files
/// are moved to a `.bak` path so the next sync can rebuild them.
fn load_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match serde_json::from_reader(reader) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let bak_path = path.with_extension("bak");
            warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "Corrupt state file, moving to .bak and treating as absent",
            );
            fs::rename(path, &bak_path)?;
            Ok(None)
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
