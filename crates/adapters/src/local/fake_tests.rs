// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tether_core::Priority;

fn seed_task(id: &str) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {}", id),
        status: "To Do".to_string(),
        acceptance_criteria: vec![
            AcceptanceCriterion::new("first", false),
            AcceptanceCriterion::new("second", true),
            AcceptanceCriterion::new("third", false),
        ],
        ..Task::default()
    }
}

#[tokio::test]
async fn update_applies_field_changes() {
    let adapter = FakeLocalAdapter::with_tasks(vec![seed_task("task-1")]);

    let update = TaskUpdate {
        title: Some("Renamed".to_string()),
        status: Some("Done".to_string()),
        priority: Some(Priority::High),
        ..TaskUpdate::default()
    };
    adapter.update_task("task-1", &update).await.unwrap();

    let task = adapter.task("task-1").unwrap();
    assert_eq!(task.title, "Renamed");
    assert_eq!(task.status, "Done");
    assert_eq!(task.priority, Priority::High);
}

#[tokio::test]
async fn ac_edits_apply_in_flag_order() {
    let adapter = FakeLocalAdapter::with_tasks(vec![seed_task("task-1")]);

    // Remove indices are issued descending so earlier removals don't
    // shift later ones.
    let update = TaskUpdate {
        remove_ac: vec![3, 1],
        add_ac: vec!["added".to_string()],
        check_ac: vec![2],
        ..TaskUpdate::default()
    };
    adapter.update_task("task-1", &update).await.unwrap();

    let acs = adapter.task("task-1").unwrap().acceptance_criteria;
    assert_eq!(acs.len(), 2);
    assert_eq!(acs[0].text, "second");
    assert_eq!(acs[1].text, "added");
    assert!(acs[1].checked);
}

#[tokio::test]
async fn create_assigns_sequential_ids() {
    let adapter = FakeLocalAdapter::new();
    let a = adapter
        .create_task(&NewTask {
            title: "A".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let b = adapter
        .create_task(&NewTask {
            title: "B".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(a, "task-1");
    assert_eq!(b, "task-2");
    assert!(adapter.task(&b).unwrap().file_path.is_some());
}

#[tokio::test]
async fn queued_failure_fires_once() {
    let adapter = FakeLocalAdapter::with_tasks(vec![seed_task("task-1")]);
    adapter.fail_next("injected");

    assert!(adapter.get_task("task-1").await.is_err());
    assert!(adapter.get_task("task-1").await.is_ok());
}

#[tokio::test]
async fn list_respects_filters() {
    let mut done = seed_task("task-2");
    done.status = "Done".to_string();
    let adapter = FakeLocalAdapter::with_tasks(vec![seed_task("task-1"), done]);

    let filter = TaskFilter {
        status: Some("Done".to_string()),
        ..TaskFilter::default()
    };
    let tasks = adapter.list_tasks(&filter).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "task-2");
}

#[tokio::test]
async fn concurrent_gets_raise_the_high_water_mark() {
    let adapter = FakeLocalAdapter::with_tasks(vec![seed_task("task-1"), seed_task("task-2")]);

    let a = adapter.clone();
    let b = adapter.clone();
    let (ra, rb) = tokio::join!(a.get_task("task-1"), b.get_task("task-2"));
    ra.unwrap();
    rb.unwrap();

    assert!(adapter.max_in_flight() >= 2);
}
