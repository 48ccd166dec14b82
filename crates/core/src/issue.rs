// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote issue records as returned by the tracker's tool server.

use serde::{Deserialize, Serialize};

/// A remote issue. Owned by the tracker; tether reads this shape from
/// tool responses and writes back through tool calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteIssue {
    /// Stable human-facing key, e.g. `PROJ-123`.
    pub key: String,
    /// Tracker-internal id.
    #[serde(default)]
    pub id: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Workflow-defined priority name, e.g. "Highest" or "P2".
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// A workflow transition offered by the tracker for one issue.
///
/// `to_status` is the destination status name; some servers omit it, in
/// which case matching falls back to the transition's own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
}

/// A tracker user as returned by user search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteUser {
    /// Account id, email, or username depending on the deployment.
    pub identifier: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
