// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync-state classification from current and base hashes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The per-mapping sync state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    InSync,
    NeedsPush,
    NeedsPull,
    Conflict,
    /// One or both base snapshots are missing; the mapping has no base to
    /// diff against and must be rebuilt by the next successful sync.
    Unknown,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::InSync => write!(f, "in-sync"),
            SyncState::NeedsPush => write!(f, "needs-push"),
            SyncState::NeedsPull => write!(f, "needs-pull"),
            SyncState::Conflict => write!(f, "conflict"),
            SyncState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classify a mapping from its current hashes and base snapshot hashes.
///
/// Pure function: "changed" means the current hash differs from the base
/// snapshot hash on that side. Missing either snapshot yields `Unknown`.
pub fn classify_sync_state(
    current_local: &str,
    current_remote: &str,
    snapshot_local: Option<&str>,
    snapshot_remote: Option<&str>,
) -> SyncState {
    let (base_local, base_remote) = match (snapshot_local, snapshot_remote) {
        (Some(l), Some(r)) => (l, r),
        _ => return SyncState::Unknown,
    };

    let local_changed = current_local != base_local;
    let remote_changed = current_remote != base_remote;

    match (local_changed, remote_changed) {
        (false, false) => SyncState::InSync,
        (true, false) => SyncState::NeedsPush,
        (false, true) => SyncState::NeedsPull,
        (true, true) => SyncState::Conflict,
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
