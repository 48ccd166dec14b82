// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for the remote tracker's tool-protocol server.
//!
//! One adapter instance owns one long-lived subprocess speaking
//! line-delimited JSON-RPC over stdio. Calls are serialized through the
//! single channel; concurrent callers queue.

mod credentials;
mod server;
mod wire;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRemoteAdapter, RemoteCall};

pub use credentials::Credentials;
pub use server::{ToolServerAdapter, ToolServerConfig};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use tether_core::{RemoteIssue, RemoteUser, Transition};

/// Errors from remote operations. Transport, tool, and shape failures
/// are kept orthogonal so callers can classify precisely (the watcher's
/// rate-limit backoff depends on it).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote adapter not ready: {0}")]
    NotReady(String),
    #[error("missing credentials: {0}")]
    Credentials(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    ResponseShape(String),
}

impl RemoteError {
    /// True when the watcher should apply the long (rate-limit) backoff.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RemoteError::RateLimited(_))
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(e: std::io::Error) -> Self {
        RemoteError::Transport(e.to_string())
    }
}

/// Typed field updates for `update_issue`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub priority_name: Option<String>,
    pub assignee: Option<String>,
}

impl IssueFields {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.labels.is_none()
            && self.priority_name.is_none()
            && self.assignee.is_none()
    }

    /// Wire form for the `jira_update_issue` tool.
    pub fn to_value(&self) -> Value {
        let mut fields = serde_json::Map::new();
        if let Some(summary) = &self.summary {
            fields.insert("summary".to_string(), Value::String(summary.clone()));
        }
        if let Some(description) = &self.description {
            fields.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        if let Some(labels) = &self.labels {
            fields.insert(
                "labels".to_string(),
                Value::Array(labels.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(priority) = &self.priority_name {
            fields.insert(
                "priority".to_string(),
                serde_json::json!({ "name": priority }),
            );
        }
        if let Some(assignee) = &self.assignee {
            fields.insert("assignee".to_string(), Value::String(assignee.clone()));
        }
        Value::Object(fields)
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub issues: Vec<RemoteIssue>,
    pub total: usize,
    pub start_at: usize,
}

/// Adapter seam for the remote tracker.
#[async_trait]
pub trait RemoteAdapter: Clone + Send + Sync + 'static {
    /// Spawn and handshake the tool server. Must complete before any
    /// other call; calling tools first yields [`RemoteError::NotReady`].
    async fn connect(&self) -> Result<(), RemoteError>;

    async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        start_at: usize,
    ) -> Result<SearchPage, RemoteError>;

    async fn get_issue(&self, key: &str) -> Result<RemoteIssue, RemoteError>;

    async fn update_issue(&self, key: &str, fields: &IssueFields) -> Result<(), RemoteError>;

    /// Create an issue; returns the created issue. When the response is
    /// missing expected fields the adapter falls back to the request's
    /// input values rather than failing the create.
    async fn create_issue(
        &self,
        project: &str,
        issue_type: &str,
        summary: &str,
        additional_fields: &IssueFields,
    ) -> Result<RemoteIssue, RemoteError>;

    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>, RemoteError>;

    async fn transition_issue(
        &self,
        key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<(), RemoteError>;

    async fn add_comment(&self, key: &str, body: &str) -> Result<(), RemoteError>;

    async fn search_users(&self, query: &str) -> Result<Vec<RemoteUser>, RemoteError>;

    async fn get_all_projects(&self) -> Result<Vec<String>, RemoteError>;

    /// Tear the child down. Safe to call twice.
    async fn close(&self) -> Result<(), RemoteError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
