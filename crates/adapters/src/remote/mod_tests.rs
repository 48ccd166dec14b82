// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn issue_fields_wire_form() {
    let fields = IssueFields {
        summary: Some("S".to_string()),
        description: Some("D".to_string()),
        labels: Some(vec!["a".to_string(), "b".to_string()]),
        priority_name: Some("High".to_string()),
        assignee: Some("alice@example.com".to_string()),
    };
    let value = fields.to_value();
    assert_eq!(value["summary"], "S");
    assert_eq!(value["priority"]["name"], "High");
    assert_eq!(value["labels"][1], "b");
    assert_eq!(value["assignee"], "alice@example.com");
}

#[test]
fn empty_issue_fields_serialize_empty() {
    let fields = IssueFields::default();
    assert!(fields.is_empty());
    assert_eq!(fields.to_value(), serde_json::json!({}));
}

#[test]
fn only_rate_limited_reports_rate_limited() {
    assert!(RemoteError::RateLimited("429".to_string()).is_rate_limited());
    for err in [
        RemoteError::NotReady("x".to_string()),
        RemoteError::Auth("x".to_string()),
        RemoteError::NotFound("x".to_string()),
        RemoteError::Protocol("x".to_string()),
        RemoteError::Transport("x".to_string()),
        RemoteError::ResponseShape("x".to_string()),
        RemoteError::Credentials("x".to_string()),
    ] {
        assert!(!err.is_rate_limited());
    }
}
