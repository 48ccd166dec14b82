// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical comparable payloads and their stable hash.
//!
//! Both sides of a mapping normalize into [`NormalizedPayload`]; equality
//! of two payloads (or of their hashes) is the whole basis of the
//! three-way merge.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::task::Priority;

/// One acceptance criterion in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcItem {
    pub text: String,
    pub checked: bool,
}

/// The canonical form of either side of a mapping.
///
/// Labels are lowercased and sorted, the assignee is lowercased, and the
/// description has the acceptance-criteria / plan / notes sections already
/// stripped, so none of those representational differences register as
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedPayload {
    pub title: String,
    pub description: String,
    /// Canonical local status name.
    pub status: String,
    pub priority: Priority,
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<AcItem>,
}

/// Stable hash of a payload, used only for equality.
///
/// Fields are serialized in a fixed order with explicit separators so the
/// digest never depends on serde representation details. Every field that
/// participates in payload equality must appear here.
pub fn payload_hash(payload: &NormalizedPayload) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"title:");
    hasher.update(payload.title.as_bytes());
    hasher.update(b"\x1fdescription:");
    hasher.update(payload.description.as_bytes());
    hasher.update(b"\x1fstatus:");
    hasher.update(payload.status.as_bytes());
    hasher.update(b"\x1fpriority:");
    hasher.update(payload.priority.to_string().as_bytes());
    hasher.update(b"\x1flabels:");
    for label in &payload.labels {
        hasher.update(label.as_bytes());
        hasher.update(b"\x1e");
    }
    hasher.update(b"\x1fassignee:");
    if let Some(assignee) = &payload.assignee {
        hasher.update(assignee.as_bytes());
    }
    hasher.update(b"\x1fac:");
    for item in &payload.acceptance_criteria {
        hasher.update(if item.checked { b"[x]" } else { b"[ ]" });
        hasher.update(item.text.as_bytes());
        hasher.update(b"\x1e");
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
