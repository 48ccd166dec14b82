// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake remote adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tether_core::{RemoteIssue, RemoteUser, Transition};

use super::{IssueFields, RemoteAdapter, RemoteError, SearchPage};

/// Recorded remote-adapter call.
#[derive(Debug, Clone)]
pub enum RemoteCall {
    Connect,
    Search { jql: String },
    Get { key: String },
    Update { key: String, fields: IssueFields },
    Create { project: String, summary: String },
    GetTransitions { key: String },
    Transition { key: String, transition_id: String },
    AddComment { key: String, body: String },
    SearchUsers { query: String },
    GetAllProjects,
    Close,
}

/// Failure to inject on the next matching call.
enum InjectedFailure {
    RateLimited(String),
    Transport(String),
    NotFound(String),
}

struct FakeRemoteState {
    issues: HashMap<String, RemoteIssue>,
    transitions: HashMap<String, Vec<Transition>>,
    users: Vec<RemoteUser>,
    projects: Vec<String>,
    calls: Vec<RemoteCall>,
    failures: VecDeque<InjectedFailure>,
    connected: bool,
    next_issue_number: u64,
}

/// In-memory remote adapter. Serves scripted issues, applies updates so
/// tests can assert on post-sync remote state, and records every call.
#[derive(Clone)]
pub struct FakeRemoteAdapter {
    inner: Arc<Mutex<FakeRemoteState>>,
}

impl Default for FakeRemoteAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeRemoteState {
                issues: HashMap::new(),
                transitions: HashMap::new(),
                users: Vec::new(),
                projects: vec!["PROJ".to_string()],
                calls: Vec::new(),
                failures: VecDeque::new(),
                connected: false,
                next_issue_number: 100,
            })),
        }
    }
}

impl FakeRemoteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_issue(&self, issue: RemoteIssue) {
        self.inner.lock().issues.insert(issue.key.clone(), issue);
    }

    /// Script the transitions offered for an issue key.
    pub fn set_transitions(&self, key: &str, transitions: Vec<Transition>) {
        self.inner
            .lock()
            .transitions
            .insert(key.to_string(), transitions);
    }

    pub fn set_users(&self, users: Vec<RemoteUser>) {
        self.inner.lock().users = users;
    }

    pub fn issue(&self, key: &str) -> Option<RemoteIssue> {
        self.inner.lock().issues.get(key).cloned()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.inner.lock().calls.clone()
    }

    pub fn fail_next_rate_limited(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .failures
            .push_back(InjectedFailure::RateLimited(message.into()));
    }

    pub fn fail_next_transport(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .failures
            .push_back(InjectedFailure::Transport(message.into()));
    }

    pub fn fail_next_not_found(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .failures
            .push_back(InjectedFailure::NotFound(message.into()));
    }

    fn take_failure(&self) -> Option<RemoteError> {
        self.inner
            .lock()
            .failures
            .pop_front()
            .map(|failure| match failure {
                InjectedFailure::RateLimited(msg) => RemoteError::RateLimited(msg),
                InjectedFailure::Transport(msg) => RemoteError::Transport(msg),
                InjectedFailure::NotFound(msg) => RemoteError::NotFound(msg),
            })
    }

    fn require_connected(&self) -> Result<(), RemoteError> {
        if self.inner.lock().connected {
            Ok(())
        } else {
            Err(RemoteError::NotReady(
                "fake adapter: call before connect".to_string(),
            ))
        }
    }
}

#[async_trait]
impl RemoteAdapter for FakeRemoteAdapter {
    async fn connect(&self) -> Result<(), RemoteError> {
        let mut state = self.inner.lock();
        state.calls.push(RemoteCall::Connect);
        state.connected = true;
        Ok(())
    }

    async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        start_at: usize,
    ) -> Result<SearchPage, RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::Search {
            jql: jql.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut issues: Vec<RemoteIssue> = self.inner.lock().issues.values().cloned().collect();
        issues.sort_by(|a, b| a.key.cmp(&b.key));
        let total = issues.len();
        let page: Vec<RemoteIssue> = issues.into_iter().skip(start_at).take(max_results).collect();
        Ok(SearchPage {
            issues: page,
            total,
            start_at,
        })
    }

    async fn get_issue(&self, key: &str) -> Result<RemoteIssue, RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::Get {
            key: key.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.issue(key)
            .ok_or_else(|| RemoteError::NotFound(format!("issue {} does not exist", key)))
    }

    async fn update_issue(&self, key: &str, fields: &IssueFields) -> Result<(), RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::Update {
            key: key.to_string(),
            fields: fields.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut state = self.inner.lock();
        let issue = state
            .issues
            .get_mut(key)
            .ok_or_else(|| RemoteError::NotFound(format!("issue {} does not exist", key)))?;
        if let Some(summary) = &fields.summary {
            issue.summary = summary.clone();
        }
        if let Some(description) = &fields.description {
            issue.description = description.clone();
        }
        if let Some(labels) = &fields.labels {
            issue.labels = labels.clone();
        }
        if let Some(priority) = &fields.priority_name {
            issue.priority = Some(priority.clone());
        }
        if let Some(assignee) = &fields.assignee {
            issue.assignee = if assignee.is_empty() {
                None
            } else {
                Some(assignee.clone())
            };
        }
        Ok(())
    }

    async fn create_issue(
        &self,
        project: &str,
        issue_type: &str,
        summary: &str,
        additional_fields: &IssueFields,
    ) -> Result<RemoteIssue, RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::Create {
            project: project.to_string(),
            summary: summary.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut state = self.inner.lock();
        state.next_issue_number += 1;
        let key = format!("{}-{}", project, state.next_issue_number);
        let issue = RemoteIssue {
            key: key.clone(),
            id: format!("1{:04}", state.next_issue_number),
            summary: summary.to_string(),
            description: additional_fields.description.clone().unwrap_or_default(),
            status: "To Do".to_string(),
            assignee: additional_fields.assignee.clone(),
            labels: additional_fields.labels.clone().unwrap_or_default(),
            priority: additional_fields.priority_name.clone(),
            issue_type: Some(issue_type.to_string()),
            created: None,
            updated: None,
        };
        state.issues.insert(key, issue.clone());
        Ok(issue)
    }

    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>, RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::GetTransitions {
            key: key.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(self
            .inner
            .lock()
            .transitions
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn transition_issue(
        &self,
        key: &str,
        transition_id: &str,
        _comment: Option<&str>,
    ) -> Result<(), RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::Transition {
            key: key.to_string(),
            transition_id: transition_id.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut state = self.inner.lock();
        let destination = state
            .transitions
            .get(key)
            .and_then(|list| list.iter().find(|t| t.id == transition_id))
            .and_then(|t| t.to_status.clone())
            .ok_or_else(|| {
                RemoteError::NotFound(format!(
                    "transition {} not available for {}",
                    transition_id, key
                ))
            })?;
        let issue = state
            .issues
            .get_mut(key)
            .ok_or_else(|| RemoteError::NotFound(format!("issue {} does not exist", key)))?;
        issue.status = destination;
        Ok(())
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<(), RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::AddComment {
            key: key.to_string(),
            body: body.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<RemoteUser>, RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::SearchUsers {
            query: query.to_string(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let lower = query.to_lowercase();
        Ok(self
            .inner
            .lock()
            .users
            .iter()
            .filter(|u| {
                u.display_name.to_lowercase().contains(&lower)
                    || u.identifier.to_lowercase().contains(&lower)
            })
            .cloned()
            .collect())
    }

    async fn get_all_projects(&self) -> Result<Vec<String>, RemoteError> {
        self.require_connected()?;
        self.inner.lock().calls.push(RemoteCall::GetAllProjects);
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        Ok(self.inner.lock().projects.clone())
    }

    async fn close(&self) -> Result<(), RemoteError> {
        let mut state = self.inner.lock();
        state.calls.push(RemoteCall::Close);
        state.connected = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
