// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use tether_adapters::{FakeLocalAdapter, FakeRemoteAdapter, RemoteAdapter};
use tether_core::{
    normalize_local, normalize_remote, AcceptanceCriterion, Priority, RemoteIssue, SyncConfig,
    Task, Transition,
};
use tether_storage::{Mapping, MappingStore};

use crate::context::SyncContext;
use crate::reconciler::Reconciler;

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub ctx: Arc<SyncContext>,
    pub local: FakeLocalAdapter,
    pub remote: FakeRemoteAdapter,
    pub reconciler: Reconciler<FakeLocalAdapter, FakeRemoteAdapter>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: SyncConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = MappingStore::open(dir.path()).unwrap();
        config.save(&store.config_path()).unwrap();
        let ctx = Arc::new(SyncContext::new(store, config, dir.path()));

        let local = FakeLocalAdapter::new();
        let remote = FakeRemoteAdapter::new();
        remote.connect().await.unwrap();
        let reconciler = Reconciler::new(local.clone(), remote.clone(), Arc::clone(&ctx));

        Self {
            dir,
            ctx,
            local,
            remote,
            reconciler,
        }
    }

    /// Seed a bound, in-sync pair: task + issue + mapping + snapshots
    /// taken from the current state of both sides.
    pub fn bind_in_sync(&self, task: &Task, issue: &RemoteIssue) {
        self.local.insert_task(task.clone());
        self.remote.insert_issue(issue.clone());
        self.ctx
            .store()
            .put_mapping(&Mapping::new(&task.id, &issue.key))
            .unwrap();
        self.ctx
            .write_snapshots(
                &task.id,
                &normalize_local(task),
                &normalize_remote(issue, &self.ctx.config()),
            )
            .unwrap();
    }

    pub fn op_count(&self) -> usize {
        self.ctx.store().read_ops().unwrap().len()
    }
}

pub fn test_config() -> SyncConfig {
    SyncConfig {
        project_key: Some("PROJ".to_string()),
        ..SyncConfig::default()
    }
}

/// A task/issue pair that normalizes identically.
pub fn in_sync_pair(n: u32) -> (Task, RemoteIssue) {
    let task = Task {
        id: format!("task-{}", n),
        title: format!("Shared title {}", n),
        description: "Shared body".to_string(),
        status: "To Do".to_string(),
        assignee: None,
        labels: vec!["bug".to_string()],
        priority: Priority::Medium,
        acceptance_criteria: Vec::new(),
        implementation_plan: String::new(),
        implementation_notes: String::new(),
        file_path: None,
    };
    let issue = RemoteIssue {
        key: format!("PROJ-{}", n),
        id: format!("1000{}", n),
        summary: format!("Shared title {}", n),
        description: "Shared body".to_string(),
        status: "To Do".to_string(),
        assignee: None,
        labels: vec!["bug".to_string()],
        priority: Some("Medium".to_string()),
        issue_type: Some("Task".to_string()),
        created: None,
        updated: None,
    };
    (task, issue)
}

pub fn ac(text: &str, checked: bool) -> AcceptanceCriterion {
    AcceptanceCriterion::new(text, checked)
}

pub fn start_progress_transition() -> Transition {
    Transition {
        id: "21".to_string(),
        name: "Start Progress".to_string(),
        to_status: Some("In Progress".to_string()),
    }
}

pub fn done_transition() -> Transition {
    Transition {
        id: "31".to_string(),
        name: "Done".to_string(),
        to_status: Some("Done".to_string()),
    }
}
