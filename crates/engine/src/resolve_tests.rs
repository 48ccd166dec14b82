// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tether_core::AcItem;

fn payload(title: &str, status: &str, priority: Priority) -> NormalizedPayload {
    NormalizedPayload {
        title: title.to_string(),
        description: "body".to_string(),
        status: status.to_string(),
        priority,
        labels: vec!["bug".to_string()],
        assignee: Some("alice".to_string()),
        acceptance_criteria: Vec::new(),
    }
}

#[test]
fn one_sided_changes_merge_regardless_of_preference() {
    let base = payload("A", "To Do", Priority::Medium);
    let local = payload("A", "In Progress", Priority::Medium);
    let remote = payload("A", "To Do", Priority::High);

    for prefer_local in [true, false] {
        let merged = merge_prefer(&base, &local, &remote, prefer_local);
        assert_eq!(merged.status, "In Progress");
        assert_eq!(merged.priority, Priority::High);
    }
}

#[test]
fn conflicting_field_takes_the_preferred_side() {
    let base = payload("A", "To Do", Priority::Medium);
    let local = payload("L", "To Do", Priority::Medium);
    let remote = payload("R", "To Do", Priority::Medium);

    assert_eq!(merge_prefer(&base, &local, &remote, true).title, "L");
    assert_eq!(merge_prefer(&base, &local, &remote, false).title, "R");
}

#[test]
fn untouched_fields_stay_at_base() {
    let base = payload("A", "To Do", Priority::Medium);
    let merged = merge_prefer(&base, &base.clone(), &base.clone(), true);
    assert_eq!(merged, base);
}

#[test]
fn acceptance_criteria_follow_the_changed_side() {
    let base = payload("A", "To Do", Priority::Medium);
    let mut local = base.clone();
    local.acceptance_criteria = vec![AcItem {
        text: "local item".to_string(),
        checked: false,
    }];
    let remote = base.clone();

    let merged = merge_prefer(&base, &local, &remote, false);
    assert_eq!(merged.acceptance_criteria, local.acceptance_criteria);
}

#[test]
fn apply_resolution_overrides_conflicting_fields() {
    let base = payload("A", "To Do", Priority::Medium);
    let local = payload("L", "To Do", Priority::Medium);
    let remote = payload("R", "To Do", Priority::Medium);

    let resolution = Resolution {
        choices: vec![(ConflictField::Title, FieldChoice::Remote)],
    };
    let merged = apply_resolution(&base, &local, &remote, &resolution).unwrap();
    assert_eq!(merged.title, "R");
}

#[test]
fn manual_values_parse_into_fields() {
    let base = payload("A", "To Do", Priority::Medium);
    let resolution = Resolution {
        choices: vec![
            (ConflictField::Title, FieldChoice::Manual("Hand-typed".to_string())),
            (ConflictField::Priority, FieldChoice::Manual("high".to_string())),
            (
                ConflictField::Labels,
                FieldChoice::Manual("Zeta, alpha, zeta".to_string()),
            ),
            (ConflictField::Assignee, FieldChoice::Manual("".to_string())),
        ],
    };
    let merged = apply_resolution(&base, &base.clone(), &base.clone(), &resolution).unwrap();
    assert_eq!(merged.title, "Hand-typed");
    assert_eq!(merged.priority, Priority::High);
    assert_eq!(merged.labels, vec!["alpha".to_string(), "zeta".to_string()]);
    assert!(merged.assignee.is_none());
}

#[test]
fn invalid_manual_priority_is_an_error() {
    let base = payload("A", "To Do", Priority::Medium);
    let resolution = Resolution {
        choices: vec![(ConflictField::Priority, FieldChoice::Manual("urgent".to_string()))],
    };
    let err = apply_resolution(&base, &base.clone(), &base.clone(), &resolution).unwrap_err();
    assert!(matches!(err, EngineError::InvalidFieldValue { .. }));
    assert!(err.to_string().contains("urgent"));
}
