// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const LIST_OUTPUT: &str = "\
ID: task-1
Title: Fix login flow
Status: In Progress
Assignee: @alice
Labels: auth, bug
Priority: high

ID: task-2
Title: Write docs
Status: To Do
Assignee: -
Priority: low
";

#[test]
fn parses_list_records() {
    let tasks = parse_task_list(LIST_OUTPUT).unwrap();
    assert_eq!(tasks.len(), 2);

    assert_eq!(tasks[0].id, "task-1");
    assert_eq!(tasks[0].title, "Fix login flow");
    assert_eq!(tasks[0].status, "In Progress");
    assert_eq!(tasks[0].assignee.as_deref(), Some("@alice"));
    assert_eq!(tasks[0].labels, vec!["auth".to_string(), "bug".to_string()]);
    assert_eq!(tasks[0].priority, Priority::High);

    assert_eq!(tasks[1].id, "task-2");
    assert!(tasks[1].assignee.is_none());
    assert_eq!(tasks[1].priority, Priority::Low);
}

#[test]
fn empty_list_output_is_empty() {
    assert!(parse_task_list("").unwrap().is_empty());
    assert!(parse_task_list("\n\n").unwrap().is_empty());
}

#[test]
fn list_record_without_id_is_an_error() {
    let err = parse_task_list("Title: orphan\n").unwrap_err();
    assert!(matches!(err, LocalError::Parse { .. }));
    assert!(err.to_string().contains("ID"));
}

const DETAIL_OUTPUT: &str = "\
Title: Fix login flow
Status: In Progress
Assignee: @alice
Labels: auth, bug
Priority: high
File: tasks/task-1.md
Description:
Users cannot log in.
Second paragraph: with a colon mid-line.
Acceptance Criteria:
- [ ] SSO works
- [x] Regression test added
Implementation Plan:
1. Reproduce
2. Fix
Implementation Notes:
Root cause was the token TTL.
";

#[test]
fn parses_detail_sections() {
    let task = parse_task_detail("task-1", DETAIL_OUTPUT).unwrap();
    assert_eq!(task.id, "task-1");
    assert_eq!(task.title, "Fix login flow");
    assert_eq!(task.status, "In Progress");
    assert_eq!(task.file_path.as_deref(), Some("tasks/task-1.md"));
    assert_eq!(
        task.description,
        "Users cannot log in.\nSecond paragraph: with a colon mid-line."
    );
    assert_eq!(task.acceptance_criteria.len(), 2);
    assert!(!task.acceptance_criteria[0].checked);
    assert_eq!(task.acceptance_criteria[0].text, "SSO works");
    assert!(task.acceptance_criteria[1].checked);
    assert_eq!(task.implementation_plan, "1. Reproduce\n2. Fix");
    assert_eq!(task.implementation_notes, "Root cause was the token TTL.");
}

#[test]
fn detail_without_optional_sections() {
    let task = parse_task_detail("task-2", "Title: Bare\nStatus: To Do\n").unwrap();
    assert_eq!(task.title, "Bare");
    assert!(task.description.is_empty());
    assert!(task.acceptance_criteria.is_empty());
}

#[test]
fn detail_without_title_is_an_error() {
    let err = parse_task_detail("task-3", "Status: To Do\n").unwrap_err();
    assert!(matches!(err, LocalError::Parse { .. }));
}

#[test]
fn stray_prose_in_ac_section_is_an_error() {
    let output = "Title: T\nStatus: To Do\nAcceptance Criteria:\nnot a checklist line\n";
    let err = parse_task_detail("task-4", output).unwrap_err();
    match err {
        LocalError::Parse { section, .. } => assert_eq!(section, "Acceptance Criteria"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_sections_are_ignored() {
    let output = "Title: T\nStatus: To Do\nRandom Section:\nanything goes\nDescription:\nbody\n";
    let task = parse_task_detail("task-5", output).unwrap();
    assert_eq!(task.description, "body");
}

// ── section_header ──────────────────────────────────────────────────

#[yare::parameterized(
    single_word = { "Description:", Some("Description") },
    two_words = { "Acceptance Criteria:", Some("Acceptance Criteria") },
    metadata_line = { "Status: Done", None },
    lowercase = { "description:", None },
    three_words = { "One Two Three:", None },
    no_colon = { "Description", None },
)]
fn section_header_detection(line: &str, expected: Option<&str>) {
    assert_eq!(section_header(line).as_deref(), expected);
}

// ── created id ──────────────────────────────────────────────────────

#[yare::parameterized(
    standard_echo = { "Created task task-42\n", "task-42" },
    with_noise = { "note: hook ran\nCreated task task-9\n", "task-9" },
    bare_id = { "task-7\n", "task-7" },
)]
fn created_id_parses(output: &str, expected: &str) {
    assert_eq!(parse_created_id(output).unwrap(), expected);
}

#[test]
fn created_id_missing_is_an_error() {
    assert!(parse_created_id("nothing useful here\n").is_err());
}
