// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake local adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tether_core::{AcceptanceCriterion, NewTask, Task, TaskFilter, TaskUpdate};

use super::{LocalAdapter, LocalError};

/// Recorded local-adapter call.
#[derive(Debug, Clone)]
pub enum LocalCall {
    List,
    Get { id: String },
    Update { id: String, update: TaskUpdate },
    Create { title: String },
}

struct FakeLocalState {
    tasks: Vec<Task>,
    calls: Vec<LocalCall>,
    failures: VecDeque<String>,
    next_id: u64,
    in_flight: usize,
    max_in_flight: usize,
}

/// In-memory local adapter. Applies updates to its stored tasks so tests
/// can assert on post-sync state, records every call, and tracks the
/// concurrency high-water mark for bounded-parallelism assertions.
#[derive(Clone)]
pub struct FakeLocalAdapter {
    inner: Arc<Mutex<FakeLocalState>>,
}

impl Default for FakeLocalAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeLocalState {
                tasks: Vec::new(),
                calls: Vec::new(),
                failures: VecDeque::new(),
                next_id: 0,
                in_flight: 0,
                max_in_flight: 0,
            })),
        }
    }
}

impl FakeLocalAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let adapter = Self::default();
        adapter.inner.lock().tasks = tasks;
        adapter
    }

    pub fn insert_task(&self, task: Task) {
        self.inner.lock().tasks.push(task);
    }

    /// Queue a failure; the next call returns it instead of succeeding.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.inner.lock().failures.push_back(message.into());
    }

    pub fn calls(&self) -> Vec<LocalCall> {
        self.inner.lock().calls.clone()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.inner.lock().tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Highest number of concurrently in-flight calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().max_in_flight
    }

    fn take_failure(&self) -> Option<LocalError> {
        self.inner.lock().failures.pop_front().map(|stderr| {
            LocalError::CommandFailed {
                args: "fake".to_string(),
                code: "1".to_string(),
                stderr,
            }
        })
    }

    fn enter(&self) {
        let mut state = self.inner.lock();
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);
    }

    fn exit(&self) {
        self.inner.lock().in_flight -= 1;
    }
}

#[async_trait]
impl LocalAdapter for FakeLocalAdapter {
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, LocalError> {
        self.inner.lock().calls.push(LocalCall::List);
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let tasks = self.inner.lock().tasks.clone();
        Ok(tasks
            .into_iter()
            .filter(|t| {
                filter.status.as_ref().is_none_or(|s| &t.status == s)
                    && filter
                        .assignee
                        .as_ref()
                        .is_none_or(|a| t.assignee.as_ref() == Some(a))
                    && filter.label.as_ref().is_none_or(|l| t.labels.contains(l))
                    && filter.priority.is_none_or(|p| t.priority == p)
            })
            .collect())
    }

    async fn get_task(&self, id: &str) -> Result<Task, LocalError> {
        self.enter();
        // Hold the slot briefly so overlapping callers overlap observably
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.exit();

        self.inner.lock().calls.push(LocalCall::Get { id: id.to_string() });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.task(id)
            .ok_or_else(|| LocalError::TaskNotFound(id.to_string()))
    }

    async fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<(), LocalError> {
        self.inner.lock().calls.push(LocalCall::Update {
            id: id.to_string(),
            update: update.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut state = self.inner.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| LocalError::TaskNotFound(id.to_string()))?;

        if let Some(title) = &update.title {
            task.title = title.clone();
        }
        if let Some(description) = &update.description {
            task.description = description.clone();
        }
        if let Some(status) = &update.status {
            task.status = status.clone();
        }
        if let Some(assignee) = &update.assignee {
            task.assignee = if assignee.is_empty() {
                None
            } else {
                Some(assignee.clone())
            };
        }
        if let Some(labels) = &update.labels {
            task.labels = labels.clone();
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        // Index-based AC edits, 1-based, applied in flag order
        for index in &update.remove_ac {
            if *index >= 1 && *index <= task.acceptance_criteria.len() {
                task.acceptance_criteria.remove(index - 1);
            }
        }
        for text in &update.add_ac {
            task.acceptance_criteria
                .push(AcceptanceCriterion::new(text.clone(), false));
        }
        for index in &update.check_ac {
            if let Some(ac) = task.acceptance_criteria.get_mut(index - 1) {
                ac.checked = true;
            }
        }
        for index in &update.uncheck_ac {
            if let Some(ac) = task.acceptance_criteria.get_mut(index - 1) {
                ac.checked = false;
            }
        }
        if let Some(plan) = &update.plan {
            task.implementation_plan = plan.clone();
        }
        if let Some(notes) = &update.append_notes {
            if !task.implementation_notes.is_empty() {
                task.implementation_notes.push('\n');
            }
            task.implementation_notes.push_str(notes);
        }
        Ok(())
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<String, LocalError> {
        self.inner.lock().calls.push(LocalCall::Create {
            title: new_task.title.clone(),
        });
        if let Some(err) = self.take_failure() {
            return Err(err);
        }

        let mut state = self.inner.lock();
        state.next_id += 1;
        let id = format!("task-{}", state.next_id);
        state.tasks.push(Task {
            id: id.clone(),
            title: new_task.title.clone(),
            description: new_task.description.clone(),
            status: new_task.status.clone().unwrap_or_else(|| "To Do".to_string()),
            assignee: new_task.assignee.clone(),
            labels: new_task.labels.clone(),
            priority: new_task.priority.unwrap_or_default(),
            acceptance_criteria: new_task.acceptance_criteria.clone(),
            implementation_plan: String::new(),
            implementation_notes: String::new(),
            file_path: Some(format!("tasks/{}.md", id)),
        });
        Ok(id)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
