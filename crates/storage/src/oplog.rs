// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL operations audit log.
//!
//! Each entry is a single line of JSON. The log is read only by humans
//! and debug views; corrupt lines are skipped, never fatal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::warn;

use crate::store::StoreError;

/// What kind of operation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Map,
    Unmap,
    Push,
    Pull,
    Sync,
    Resolve,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Map => write!(f, "map"),
            Operation::Unmap => write!(f, "unmap"),
            Operation::Push => write!(f, "push"),
            Operation::Pull => write!(f, "pull"),
            Operation::Sync => write!(f, "sync"),
            Operation::Resolve => write!(f, "resolve"),
            Operation::Import => write!(f, "import"),
        }
    }
}

/// Outcome of the recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    Ok,
    Failed,
}

/// One audit-log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpLogEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub local_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    pub status: OpStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl OpLogEntry {
    pub fn ok(operation: Operation, local_id: impl Into<String>, remote_key: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            local_id: local_id.into(),
            remote_key,
            status: OpStatus::Ok,
            detail: None,
        }
    }

    pub fn failed(
        operation: Operation,
        local_id: impl Into<String>,
        remote_key: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            local_id: local_id.into(),
            remote_key,
            status: OpStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// The JSONL log file. Appends open, write, and sync per entry; the log
/// is low-volume (one line per reconciliation outcome).
pub struct OpLog {
    path: PathBuf,
}

impl OpLog {
    pub fn open(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, entry: &OpLogEntry) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.sync_all()?;
        Ok(())
    }

    /// Read every entry, oldest first, skipping corrupt lines.
    pub fn read_all(&self) -> Result<Vec<OpLogEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str(trimmed) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(
                        line = lineno + 1,
                        error = %e,
                        path = %self.path.display(),
                        "Corrupt op-log line, skipping",
                    );
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "oplog_tests.rs"]
mod tests;
