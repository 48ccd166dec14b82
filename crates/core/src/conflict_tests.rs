// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::task::Priority;

fn payload(title: &str, status: &str) -> NormalizedPayload {
    NormalizedPayload {
        title: title.to_string(),
        description: "body".to_string(),
        status: status.to_string(),
        priority: Priority::Medium,
        labels: vec!["bug".to_string()],
        assignee: Some("alice".to_string()),
        acceptance_criteria: Vec::new(),
    }
}

#[test]
fn no_conflicts_when_sides_agree() {
    let base = payload("A", "To Do");
    let local = payload("B", "To Do");
    let remote = payload("B", "To Do");
    assert!(detect_field_conflicts(&base, &local, &remote).is_empty());
}

#[test]
fn one_sided_change_is_not_a_conflict() {
    let base = payload("A", "To Do");
    let local = payload("B", "To Do");
    let remote = payload("A", "To Do");
    assert!(detect_field_conflicts(&base, &local, &remote).is_empty());
}

#[test]
fn both_sides_changed_same_field_conflicts() {
    let base = payload("A", "To Do");
    let local = payload("L", "To Do");
    let remote = payload("R", "To Do");

    let conflicts = detect_field_conflicts(&base, &local, &remote);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].field, ConflictField::Title);
    assert_eq!(conflicts[0].base_value, "A");
    assert_eq!(conflicts[0].local_value, "L");
    assert_eq!(conflicts[0].remote_value, "R");
}

#[test]
fn disjoint_field_changes_conflict_separately() {
    let base = payload("A", "To Do");
    let local = payload("L", "To Do");
    let mut remote = payload("R", "To Do");
    remote.priority = Priority::High;

    let conflicts = detect_field_conflicts(&base, &local, &remote);
    // Title conflicts (both changed, disagreeing); priority does not
    // (only remote moved it).
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].field, ConflictField::Title);
}

#[test]
fn labels_conflict_uses_joined_rendering() {
    let base = payload("A", "To Do");
    let mut local = payload("A", "To Do");
    local.labels = vec!["auth".to_string(), "bug".to_string()];
    let mut remote = payload("A", "To Do");
    remote.labels = vec!["urgent".to_string()];

    let conflicts = detect_field_conflicts(&base, &local, &remote);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].field, ConflictField::Labels);
    assert_eq!(conflicts[0].local_value, "auth, bug");
    assert_eq!(conflicts[0].remote_value, "urgent");
}

#[test]
fn resolution_side_counts_skip_manual() {
    let resolution = Resolution {
        choices: vec![
            (ConflictField::Title, FieldChoice::Local),
            (ConflictField::Status, FieldChoice::Local),
            (ConflictField::Priority, FieldChoice::Remote),
            (ConflictField::Description, FieldChoice::Manual("x".to_string())),
        ],
    };
    assert_eq!(resolution.side_counts(), (2, 1));
}

#[test]
fn resolution_choice_lookup() {
    let resolution = Resolution {
        choices: vec![(ConflictField::Title, FieldChoice::Remote)],
    };
    assert_eq!(
        resolution.choice_for(ConflictField::Title),
        Some(&FieldChoice::Remote)
    );
    assert_eq!(resolution.choice_for(ConflictField::Status), None);
}
