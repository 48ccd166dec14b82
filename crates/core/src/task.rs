// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local task records as read from the owning `task` CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority, the canonical three-level scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// One checkable acceptance criterion, ordered within its task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriterion {
    pub text: String,
    pub checked: bool,
}

impl AcceptanceCriterion {
    pub fn new(text: impl Into<String>, checked: bool) -> Self {
        Self {
            text: text.into(),
            checked,
        }
    }
}

/// A local task record. Owned by the `task` CLI; tether only ever reads
/// this shape and writes back through CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
    #[serde(default)]
    pub implementation_plan: String,
    #[serde(default)]
    pub implementation_notes: String,
    /// Path of the backing markdown file, when the CLI reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Filters for `task list`.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.assignee.is_none()
            && self.label.is_none()
            && self.priority.is_none()
    }
}

/// A mutation applied through `task edit`. Only set fields are passed as
/// flags; acceptance-criteria edits are index-based against the task's
/// current AC list.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub labels: Option<Vec<String>>,
    pub priority: Option<Priority>,
    pub add_ac: Vec<String>,
    /// 1-based indices, issued in the order given.
    pub remove_ac: Vec<usize>,
    pub check_ac: Vec<usize>,
    pub uncheck_ac: Vec<usize>,
    pub plan: Option<String>,
    pub append_notes: Option<String>,
}

impl TaskUpdate {
    /// True when the update carries no flags at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
            && self.labels.is_none()
            && self.priority.is_none()
            && self.add_ac.is_empty()
            && self.remove_ac.is_empty()
            && self.check_ac.is_empty()
            && self.uncheck_ac.is_empty()
            && self.plan.is_none()
            && self.append_notes.is_none()
    }
}

/// Inputs for `task create`.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub priority: Option<Priority>,
    pub acceptance_criteria: Vec<AcceptanceCriterion>,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
