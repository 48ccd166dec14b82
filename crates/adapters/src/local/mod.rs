// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for the owning local `task` CLI.
//!
//! Every operation is a subprocess invocation with `--plain` output; the
//! engine never touches task-file bodies directly. The binary name
//! defaults to `task` and can be overridden with `TETHER_TASK_BIN`.

mod parse;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLocalAdapter, LocalCall};

use async_trait::async_trait;
use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use tether_core::{NewTask, Task, TaskFilter, TaskUpdate};

/// Default timeout for a single `task` CLI invocation.
const TASK_CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from local CLI operations.
#[derive(Debug, Error)]
pub enum LocalError {
    #[error("task CLI '{0}' not found on PATH")]
    CliNotFound(String),
    #[error("task {args} failed ({code}): {stderr}")]
    CommandFailed {
        args: String,
        code: String,
        stderr: String,
    },
    #[error("task {0} timed out after {1}s")]
    Timeout(String, u64),
    #[error("failed to parse task output ({section}): {message}")]
    Parse { section: String, message: String },
    #[error("task not found: {0}")]
    TaskNotFound(String),
}

/// Adapter seam for the local task store.
#[async_trait]
pub trait LocalAdapter: Clone + Send + Sync + 'static {
    /// List tasks, optionally filtered by status / assignee / label /
    /// priority.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, LocalError>;

    /// Fetch one task with full detail (description, AC, plan, notes).
    async fn get_task(&self, id: &str) -> Result<Task, LocalError>;

    /// Apply a mutation through `task edit`.
    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<(), LocalError>;

    /// Create a task through `task create`; returns the new id.
    async fn create_task(&self, task: &NewTask) -> Result<String, LocalError>;
}

/// The real subprocess-backed adapter.
#[derive(Debug, Clone)]
pub struct CliLocalAdapter {
    bin: String,
}

impl CliLocalAdapter {
    pub fn new() -> Self {
        let bin = std::env::var("TETHER_TASK_BIN").unwrap_or_else(|_| "task".to_string());
        Self { bin }
    }

    pub fn with_bin(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Run the CLI with a timeout, surfacing spawn failures, timeouts,
    /// and non-zero exits as typed errors.
    async fn run(&self, args: &[String]) -> Result<String, LocalError> {
        let label = args.first().cloned().unwrap_or_default();
        debug!(bin = %self.bin, args = ?args, "invoking task CLI");

        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        cmd.kill_on_drop(true);

        let output: Output =
            match tokio::time::timeout(TASK_CLI_TIMEOUT, cmd.output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(LocalError::CliNotFound(self.bin.clone()));
                }
                Ok(Err(e)) => {
                    return Err(LocalError::CommandFailed {
                        args: label,
                        code: "spawn".to_string(),
                        stderr: e.to_string(),
                    });
                }
                Err(_elapsed) => {
                    return Err(LocalError::Timeout(label, TASK_CLI_TIMEOUT.as_secs()));
                }
            };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LocalError::CommandFailed {
                args: args.join(" "),
                code: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for CliLocalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalAdapter for CliLocalAdapter {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, LocalError> {
        let mut args = vec!["list".to_string(), "--plain".to_string()];
        if let Some(status) = &filter.status {
            args.push("--status".to_string());
            args.push(status.clone());
        }
        if let Some(assignee) = &filter.assignee {
            args.push("--assignee".to_string());
            args.push(assignee.clone());
        }
        if let Some(label) = &filter.label {
            args.push("--label".to_string());
            args.push(label.clone());
        }
        if let Some(priority) = filter.priority {
            args.push("--priority".to_string());
            args.push(priority.to_string());
        }

        let stdout = self.run(&args).await?;
        parse::parse_task_list(&stdout)
    }

    async fn get_task(&self, id: &str) -> Result<Task, LocalError> {
        let args = vec![id.to_string(), "--plain".to_string()];
        let stdout = self.run(&args).await?;
        if stdout.trim().is_empty() {
            return Err(LocalError::TaskNotFound(id.to_string()));
        }
        parse::parse_task_detail(id, &stdout)
    }

    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<(), LocalError> {
        if update.is_empty() {
            return Ok(());
        }

        let mut args = vec!["edit".to_string(), id.to_string()];
        if let Some(title) = &update.title {
            args.push("--title".to_string());
            args.push(title.clone());
        }
        if let Some(description) = &update.description {
            args.push("--description".to_string());
            args.push(description.clone());
        }
        if let Some(status) = &update.status {
            args.push("--status".to_string());
            args.push(status.clone());
        }
        if let Some(assignee) = &update.assignee {
            args.push("--assignee".to_string());
            args.push(assignee.clone());
        }
        if let Some(labels) = &update.labels {
            for label in labels {
                args.push("--label".to_string());
                args.push(label.clone());
            }
        }
        if let Some(priority) = update.priority {
            args.push("--priority".to_string());
            args.push(priority.to_string());
        }
        for text in &update.add_ac {
            args.push("--add-ac".to_string());
            args.push(text.clone());
        }
        for index in &update.remove_ac {
            args.push("--remove-ac".to_string());
            args.push(index.to_string());
        }
        for index in &update.check_ac {
            args.push("--check-ac".to_string());
            args.push(index.to_string());
        }
        for index in &update.uncheck_ac {
            args.push("--uncheck-ac".to_string());
            args.push(index.to_string());
        }
        if let Some(plan) = &update.plan {
            args.push("--plan".to_string());
            args.push(plan.clone());
        }
        if let Some(notes) = &update.append_notes {
            args.push("--append-notes".to_string());
            args.push(notes.clone());
        }

        self.run(&args).await?;
        Ok(())
    }

    async fn create_task(&self, task: &NewTask) -> Result<String, LocalError> {
        let mut args = vec!["create".to_string(), task.title.clone()];
        if !task.description.is_empty() {
            args.push("--description".to_string());
            args.push(task.description.clone());
        }
        if let Some(status) = &task.status {
            args.push("--status".to_string());
            args.push(status.clone());
        }
        if let Some(assignee) = &task.assignee {
            args.push("--assignee".to_string());
            args.push(assignee.clone());
        }
        for label in &task.labels {
            args.push("--label".to_string());
            args.push(label.clone());
        }
        if let Some(priority) = task.priority {
            args.push("--priority".to_string());
            args.push(priority.to_string());
        }
        for ac in &task.acceptance_criteria {
            args.push("--add-ac".to_string());
            args.push(ac.text.clone());
        }
        // Checked state rides on the same 1-based indices the criteria
        // were just added under
        for (index, ac) in task.acceptance_criteria.iter().enumerate() {
            if ac.checked {
                args.push("--check-ac".to_string());
                args.push((index + 1).to_string());
            }
        }

        let stdout = self.run(&args).await?;
        parse::parse_created_id(&stdout)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
