// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed configuration document (`config.json`).
//!
//! Loaded once per command invocation and treated as immutable for its
//! duration. The single exception is `conflictStrategy`, which the
//! interactive resolver may persist back at the user's request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::task::Priority;

/// Errors from config load/save.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config not found at {0} (run `tether init` first)")]
    NotFound(String),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid interval '{0}': expected forms like 60s, 5m, 1h")]
    InvalidInterval(String),
}

/// How conflicts are resolved when both sides changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    PreferLocal,
    PreferRemote,
    #[default]
    Prompt,
    Manual,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictStrategy::PreferLocal => write!(f, "prefer-local"),
            ConflictStrategy::PreferRemote => write!(f, "prefer-remote"),
            ConflictStrategy::Prompt => write!(f, "prompt"),
            ConflictStrategy::Manual => write!(f, "manual"),
        }
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-local" => Ok(ConflictStrategy::PreferLocal),
            "prefer-remote" => Ok(ConflictStrategy::PreferRemote),
            "prompt" => Ok(ConflictStrategy::Prompt),
            "manual" => Ok(ConflictStrategy::Manual),
            other => Err(format!(
                "unknown strategy '{}': expected prefer-local, prefer-remote, prompt, or manual",
                other
            )),
        }
    }
}

/// Per-remote-project mapping overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectOverrides {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub status_mapping: HashMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub priority_mapping: HashMap<String, Vec<String>>,
}

/// The configuration document. Serialized as `config.json` with camelCase
/// keys so it reads the way the rest of the on-disk state does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Local status → acceptable remote statuses, first entry preferred.
    pub status_mapping: HashMap<String, Vec<String>>,
    /// Local priority (high/medium/low) → acceptable remote priority
    /// names, first entry preferred.
    pub priority_mapping: HashMap<String, Vec<String>>,
    /// Explicit local-user → remote-user mappings. Always wins over
    /// auto-discovered entries.
    pub assignee_mapping: HashMap<String, String>,
    /// Mappings discovered by fuzzy assignee matching. Never shadows an
    /// explicit entry.
    pub auto_mapped_assignees: HashMap<String, String>,
    pub conflict_strategy: ConflictStrategy,
    /// Remote query used to scope import and watch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jql_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_key: Option<String>,
    pub issue_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_interval: Option<String>,
    pub batch_concurrency: usize,
    /// External tool-server command (binary + args). When absent, the
    /// docker transport is used directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_command: Option<Vec<String>>,
    /// Fall back to the containerized transport when the external server
    /// command fails to connect.
    pub fallback_to_docker: bool,
    pub docker_image: String,
    /// Merge implementation plan / notes into the remote description as
    /// trailing sections.
    pub sync_plan_and_notes: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub project_overrides: HashMap<String, ProjectOverrides>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let mut status_mapping = HashMap::new();
        status_mapping.insert(
            "To Do".to_string(),
            vec![
                "To Do".to_string(),
                "Open".to_string(),
                "Backlog".to_string(),
            ],
        );
        status_mapping.insert("In Progress".to_string(), vec!["In Progress".to_string()]);
        status_mapping.insert(
            "Done".to_string(),
            vec![
                "Done".to_string(),
                "Closed".to_string(),
                "Resolved".to_string(),
            ],
        );

        let mut priority_mapping = HashMap::new();
        priority_mapping.insert(
            "high".to_string(),
            vec!["High".to_string(), "Highest".to_string()],
        );
        priority_mapping.insert("medium".to_string(), vec!["Medium".to_string()]);
        priority_mapping.insert(
            "low".to_string(),
            vec!["Low".to_string(), "Lowest".to_string()],
        );

        Self {
            status_mapping,
            priority_mapping,
            assignee_mapping: HashMap::new(),
            auto_mapped_assignees: HashMap::new(),
            conflict_strategy: ConflictStrategy::default(),
            jql_filter: None,
            project_key: None,
            issue_type: "Task".to_string(),
            sync_interval: None,
            batch_concurrency: 10,
            server_command: None,
            fallback_to_docker: false,
            docker_image: "ghcr.io/sooperset/mcp-atlassian:latest".to_string(),
            sync_plan_and_notes: false,
            project_overrides: HashMap::new(),
        }
    }
}

impl SyncConfig {
    /// Load the config document, failing with an actionable message when
    /// it is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })
    }

    /// Save atomically (write to .tmp, then rename).
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|source| ConfigError::Invalid {
                path: path.display().to_string(),
                source,
            })?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|source| ConfigError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn status_map_for<'a>(
        &'a self,
        project: Option<&str>,
    ) -> &'a HashMap<String, Vec<String>> {
        if let Some(key) = project {
            if let Some(overrides) = self.project_overrides.get(key) {
                if !overrides.status_mapping.is_empty() {
                    return &overrides.status_mapping;
                }
            }
        }
        &self.status_mapping
    }

    fn priority_map_for<'a>(
        &'a self,
        project: Option<&str>,
    ) -> &'a HashMap<String, Vec<String>> {
        if let Some(key) = project {
            if let Some(overrides) = self.project_overrides.get(key) {
                if !overrides.priority_mapping.is_empty() {
                    return &overrides.priority_mapping;
                }
            }
        }
        &self.priority_mapping
    }

    /// Acceptable remote statuses for a local status, first preferred.
    pub fn remote_statuses_for(&self, local_status: &str, project: Option<&str>) -> Vec<String> {
        self.status_map_for(project)
            .get(local_status)
            .cloned()
            .unwrap_or_default()
    }

    /// Reverse status lookup: the canonical local status whose acceptable
    /// list contains the remote status (case-insensitive).
    pub fn canonical_status_for_remote(
        &self,
        remote_status: &str,
        project: Option<&str>,
    ) -> Option<String> {
        let map = self.status_map_for(project);
        // Exact match first so "Done" beats a case-folded alias elsewhere.
        for (local, remotes) in map {
            if remotes.iter().any(|r| r == remote_status) {
                return Some(local.clone());
            }
        }
        let lower = remote_status.to_lowercase();
        for (local, remotes) in map {
            if remotes.iter().any(|r| r.to_lowercase() == lower) {
                return Some(local.clone());
            }
        }
        None
    }

    /// Preferred remote priority name for a local priority (first entry in
    /// the configured list).
    pub fn remote_priority_for(&self, priority: Priority, project: Option<&str>) -> Option<String> {
        self.priority_map_for(project)
            .get(&priority.to_string())
            .and_then(|names| names.first().cloned())
    }

    /// Reverse priority lookup (case-insensitive). `None` means the remote
    /// name is not configured anywhere; callers default to medium.
    pub fn canonical_priority_for_remote(
        &self,
        remote_priority: &str,
        project: Option<&str>,
    ) -> Option<Priority> {
        let lower = remote_priority.to_lowercase();
        for (local, names) in self.priority_map_for(project) {
            if names.iter().any(|n| n.to_lowercase() == lower) {
                return local.parse().ok();
            }
        }
        None
    }

    /// Remote identifier for a local assignee. Explicit mappings shadow
    /// auto-discovered ones.
    pub fn remote_assignee_for(&self, local: &str) -> Option<&str> {
        self.assignee_mapping
            .get(local)
            .or_else(|| self.auto_mapped_assignees.get(local))
            .map(String::as_str)
    }

    /// Local identifier for a remote assignee (reverse lookup, explicit
    /// entries first).
    pub fn local_assignee_for(&self, remote: &str) -> Option<&str> {
        let lower = remote.to_lowercase();
        self.assignee_mapping
            .iter()
            .find(|(_, v)| v.to_lowercase() == lower)
            .or_else(|| {
                self.auto_mapped_assignees
                    .iter()
                    .find(|(_, v)| v.to_lowercase() == lower)
            })
            .map(|(k, _)| k.as_str())
    }
}

/// Parse an interval of the form `60s`, `5m`, or `1h`. A bare number is
/// taken as seconds.
pub fn parse_interval(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(pos) => s.split_at(pos),
        None => (s, "s"),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| ConfigError::InvalidInterval(s.to_string()))?;
    if value == 0 {
        return Err(ConfigError::InvalidInterval(s.to_string()));
    }
    match unit {
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 3600)),
        _ => Err(ConfigError::InvalidInterval(s.to_string())),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
