// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

// ── framing ─────────────────────────────────────────────────────────

#[test]
fn request_encodes_as_single_line() {
    let line = RpcRequest::call(7, "tools/call", json!({"name": "jira_search"}))
        .encode()
        .unwrap();
    assert!(line.ends_with('\n'));
    assert!(!line.trim_end().contains('\n'));
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(value["jsonrpc"], "2.0");
    assert_eq!(value["id"], 7);
}

#[test]
fn notification_has_no_id() {
    let line = RpcRequest::notification("notifications/initialized")
        .encode()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert!(value.get("id").is_none());
}

#[test]
fn decode_skips_non_response_lines() {
    assert!(decode_response("").is_none());
    assert!(decode_response("INFO starting server").is_none());
    // Notification from the server: JSON but no id
    assert!(decode_response(r#"{"jsonrpc":"2.0","method":"log"}"#).is_none());

    let response =
        decode_response(r#"{"jsonrpc":"2.0","id":3,"result":{"ok":true}}"#).unwrap();
    assert_eq!(response.id, Some(3));
    assert!(response.result.is_some());
}

#[test]
fn decode_carries_error_body() {
    let response =
        decode_response(r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"no such method"}}"#)
            .unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32601);
    assert_eq!(error.message, "no such method");
}

// ── envelopes ───────────────────────────────────────────────────────

fn envelope(text: &str) -> serde_json::Value {
    json!({ "content": [ { "type": "text", "text": text } ] })
}

#[test]
fn extract_joins_content_text() {
    let result = json!({ "content": [
        { "type": "text", "text": "line one" },
        { "type": "text", "text": "line two" },
    ]});
    assert_eq!(extract_tool_text(&result).unwrap(), "line one\nline two");
}

#[test]
fn extract_rejects_non_object_result() {
    assert!(matches!(
        extract_tool_text(&json!("bare string")),
        Err(RemoteError::Protocol(_))
    ));
    assert!(matches!(
        extract_tool_text(&json!({ "noContent": true })),
        Err(RemoteError::Protocol(_))
    ));
}

#[test]
fn declared_is_error_envelope_is_a_tool_failure() {
    let result = json!({
        "isError": true,
        "content": [ { "type": "text", "text": "Error: issue PROJ-9 not found" } ],
    });
    assert!(matches!(
        extract_tool_text(&result),
        Err(RemoteError::NotFound(_))
    ));
}

#[yare::parameterized(
    rate_limit_word = { "Error: rate limit exceeded, retry later" },
    http_429 = { "Error: request failed with 429 Too Many Requests" },
)]
fn rate_limit_text_classifies(text: &str) {
    assert!(matches!(
        extract_tool_text(&envelope(text)),
        Err(RemoteError::RateLimited(_))
    ));
}

#[yare::parameterized(
    http_401 = { "Error: 401 Unauthorized", true },
    http_403 = { "Error: 403 Forbidden for this resource", true },
    plain_prose = { "Issue updated successfully", false },
)]
fn auth_text_classifies(text: &str, is_auth: bool) {
    let result = extract_tool_text(&envelope(text));
    if is_auth {
        assert!(matches!(result, Err(RemoteError::Auth(_))));
    } else {
        assert!(result.is_ok());
    }
}

#[test]
fn http_5xx_error_mention_is_a_tool_failure() {
    let result = extract_tool_text(&envelope("Request error: upstream returned 503"));
    assert!(matches!(result, Err(RemoteError::Protocol(_))));
}

#[test]
fn error_text_preserves_the_original_message() {
    let err = extract_tool_text(&envelope("Error: 404 issue does not exist")).unwrap_err();
    assert!(err.to_string().contains("404 issue does not exist"));
}

#[test]
fn bare_numbers_without_error_are_fine() {
    // "500" alone in prose must not trip the classifier
    assert!(extract_tool_text(&envelope("Moved 500 issues to the new board")).is_ok());
}

// ── payload parsing ─────────────────────────────────────────────────

#[test]
fn parse_issue_flat_shape() {
    let issue = parse_issue(&json!({
        "key": "PROJ-1",
        "id": "10001",
        "summary": "Fix login",
        "description": "body",
        "status": { "name": "In Progress" },
        "assignee": { "displayName": "Alice" },
        "labels": ["auth", "bug"],
        "priority": { "name": "High" },
        "issuetype": { "name": "Task" },
    }))
    .unwrap();

    assert_eq!(issue.key, "PROJ-1");
    assert_eq!(issue.summary, "Fix login");
    assert_eq!(issue.status, "In Progress");
    assert_eq!(issue.assignee.as_deref(), Some("Alice"));
    assert_eq!(issue.priority.as_deref(), Some("High"));
    assert_eq!(issue.issue_type.as_deref(), Some("Task"));
}

#[test]
fn parse_issue_nested_fields_shape() {
    let issue = parse_issue(&json!({
        "key": "PROJ-2",
        "fields": {
            "summary": "Nested",
            "status": "Done",
            "priority": "Low",
        },
    }))
    .unwrap();
    assert_eq!(issue.summary, "Nested");
    assert_eq!(issue.status, "Done");
    assert_eq!(issue.priority.as_deref(), Some("Low"));
}

#[test]
fn parse_issue_missing_key_is_shape_error() {
    assert!(matches!(
        parse_issue(&json!({ "summary": "no key" })),
        Err(RemoteError::ResponseShape(_))
    ));
}

#[test]
fn parse_issue_missing_summary_is_shape_error() {
    assert!(matches!(
        parse_issue(&json!({ "key": "PROJ-3" })),
        Err(RemoteError::ResponseShape(_))
    ));
}

#[test]
fn parse_search_page_counts() {
    let page = parse_search_page(&json!({
        "total": 12,
        "start_at": 5,
        "issues": [ { "key": "PROJ-6", "summary": "S", "status": "To Do" } ],
    }))
    .unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.start_at, 5);
    assert_eq!(page.issues.len(), 1);
}

#[test]
fn parse_transitions_with_and_without_destination() {
    let transitions = parse_transitions(&json!({
        "transitions": [
            { "id": "11", "name": "Start Progress", "to": { "name": "In Progress" } },
            { "id": 21, "name": "Resolve Issue" },
        ],
    }))
    .unwrap();
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].to_status.as_deref(), Some("In Progress"));
    assert_eq!(transitions[1].id, "21");
    assert!(transitions[1].to_status.is_none());
}

#[test]
fn parse_users_prefers_account_id() {
    let users = parse_users(&json!([
        { "accountId": "abc123", "displayName": "Alice Smith", "emailAddress": "a@x.io" },
        { "name": "bob", "displayName": "Bob" },
    ]))
    .unwrap();
    assert_eq!(users[0].identifier, "abc123");
    assert_eq!(users[0].display_name, "Alice Smith");
    assert_eq!(users[1].identifier, "bob");
}

#[test]
fn parse_project_keys_both_shapes() {
    let keys = parse_project_keys(&json!({ "projects": [ { "key": "PROJ" }, "OPS" ] })).unwrap();
    assert_eq!(keys, vec!["PROJ".to_string(), "OPS".to_string()]);
}

#[test]
fn parse_json_payload_error_names_the_snippet() {
    let err = parse_json_payload("definitely not json").unwrap_err();
    assert!(matches!(err, RemoteError::ResponseShape(_)));
    assert!(err.to_string().contains("definitely not json"));
}
