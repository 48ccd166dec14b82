// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format for the tool protocol: line-delimited JSON-RPC 2.0, plus
//! tool-response envelope validation and payload parsing.
//!
//! Tool results arrive as an envelope with a `content` array; the text
//! payload inside is either prose, JSON, or an error string. Error text
//! (an `Error:` prefix or an HTTP 4xx/5xx mention) is a *tool* failure,
//! classified separately from transport failures.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use tether_core::{RemoteIssue, RemoteUser, Transition};

use super::{RemoteError, SearchPage};

/// A JSON-RPC request line.
#[derive(Debug, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn call(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method: method.into(),
            params: Some(params),
        }
    }

    /// A notification (no id, no response expected).
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method: method.into(),
            params: None,
        }
    }

    pub fn encode(&self) -> Result<String, RemoteError> {
        let mut line = serde_json::to_string(self)
            .map_err(|e| RemoteError::Protocol(format!("encode request: {}", e)))?;
        line.push('\n');
        Ok(line)
    }
}

/// A JSON-RPC response line.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// Parse one received line as a response. Returns `None` for lines that
/// are not responses (notifications, stray server logging).
pub fn decode_response(line: &str) -> Option<RpcResponse> {
    let trimmed = line.trim();
    if trimmed.is_empty() || !trimmed.starts_with('{') {
        return None;
    }
    let response: RpcResponse = serde_json::from_str(trimmed).ok()?;
    response.id?;
    Some(response)
}

/// Extract the text payload from a tool-response envelope, raising typed
/// errors for declared errors, error-shaped text, and malformed
/// envelopes. The original text is always preserved in the error.
pub fn extract_tool_text(result: &Value) -> Result<String, RemoteError> {
    let obj = result
        .as_object()
        .ok_or_else(|| RemoteError::Protocol(format!("tool result is not an object: {}", result)))?;

    let content = obj
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| RemoteError::Protocol("tool result has no content array".to_string()))?;

    let text = content
        .iter()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    let is_error = obj.get("isError").and_then(Value::as_bool).unwrap_or(false);
    if is_error {
        return Err(classify_tool_error(&text));
    }
    if let Some(err) = detect_error_text(&text) {
        return Err(err);
    }
    Ok(text)
}

/// Heuristic error detection on successful-looking envelopes: some
/// servers report tool failures as plain text.
fn detect_error_text(text: &str) -> Option<RemoteError> {
    let trimmed = text.trim_start();
    if trimmed.starts_with("Error:") {
        return Some(classify_tool_error(text));
    }
    if http_error_pattern().is_match(text) && text.to_lowercase().contains("error") {
        return Some(classify_tool_error(text));
    }
    None
}

fn http_error_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern
        Regex::new(r"\b[45]\d\d\b").unwrap()
    })
}

/// Classify error text into the adapter taxonomy, preserving it.
pub fn classify_tool_error(text: &str) -> RemoteError {
    let lower = text.to_lowercase();
    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        return RemoteError::RateLimited(text.to_string());
    }
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("authentication")
    {
        return RemoteError::Auth(text.to_string());
    }
    if lower.contains("404") || lower.contains("not found") || lower.contains("does not exist") {
        return RemoteError::NotFound(text.to_string());
    }
    RemoteError::Protocol(text.to_string())
}

/// Parse a tool text payload as JSON.
pub fn parse_json_payload(text: &str) -> Result<Value, RemoteError> {
    serde_json::from_str(text.trim()).map_err(|e| {
        RemoteError::ResponseShape(format!(
            "expected JSON payload, got parse error '{}' in: {}",
            e,
            snippet(text)
        ))
    })
}

fn snippet(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(120)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

/// A string field that may arrive bare or wrapped (`{"name": ...}`,
/// `{"displayName": ...}`). Trackers are not consistent here.
fn string_or_named(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => ["name", "displayName", "display_name", "emailAddress", "email", "accountId"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str).map(str::to_string)),
        _ => None,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parse one issue object. The fields may be flat or nested under
/// `fields` (both shapes exist in the wild).
pub fn parse_issue(value: &Value) -> Result<RemoteIssue, RemoteError> {
    let key = str_field(value, "key")
        .ok_or_else(|| RemoteError::ResponseShape(format!("issue without key: {}", value)))?;

    let fields = value.get("fields").unwrap_or(value);

    let summary = str_field(fields, "summary").ok_or_else(|| {
        RemoteError::ResponseShape(format!("issue {} has no summary", key))
    })?;

    let status = fields
        .get("status")
        .and_then(string_or_named)
        .unwrap_or_default();

    Ok(RemoteIssue {
        key,
        id: str_field(value, "id").unwrap_or_default(),
        summary,
        description: str_field(fields, "description").unwrap_or_default(),
        status,
        assignee: fields.get("assignee").and_then(string_or_named),
        labels: fields
            .get("labels")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        priority: fields.get("priority").and_then(string_or_named),
        issue_type: fields
            .get("issue_type")
            .or_else(|| fields.get("issuetype"))
            .and_then(string_or_named),
        created: str_field(fields, "created"),
        updated: str_field(fields, "updated"),
    })
}

/// Parse a `jira_search` payload into a page.
pub fn parse_search_page(payload: &Value) -> Result<SearchPage, RemoteError> {
    let issues_value = payload
        .get("issues")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            RemoteError::ResponseShape("search payload has no issues array".to_string())
        })?;

    let mut issues = Vec::with_capacity(issues_value.len());
    for value in issues_value {
        issues.push(parse_issue(value)?);
    }

    let as_usize = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    };

    Ok(SearchPage {
        total: as_usize("total").unwrap_or(issues.len()),
        start_at: as_usize("start_at").or_else(|| as_usize("startAt")).unwrap_or(0),
        issues,
    })
}

/// Parse a `jira_get_transitions` payload.
pub fn parse_transitions(payload: &Value) -> Result<Vec<Transition>, RemoteError> {
    let list = payload
        .get("transitions")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .ok_or_else(|| {
            RemoteError::ResponseShape("transitions payload has no transitions array".to_string())
        })?;

    let mut transitions = Vec::with_capacity(list.len());
    for value in list {
        let id = value
            .get("id")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .ok_or_else(|| {
                RemoteError::ResponseShape(format!("transition without id: {}", value))
            })?;
        let name = str_field(value, "name").unwrap_or_default();
        let to_status = value
            .get("to")
            .and_then(string_or_named)
            .or_else(|| str_field(value, "to_status"));
        transitions.push(Transition { id, name, to_status });
    }
    Ok(transitions)
}

/// Parse a `jira_search_user` payload.
pub fn parse_users(payload: &Value) -> Result<Vec<RemoteUser>, RemoteError> {
    let list = payload
        .get("users")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .ok_or_else(|| RemoteError::ResponseShape("user payload has no users array".to_string()))?;

    Ok(list
        .iter()
        .filter_map(|value| {
            let identifier = str_field(value, "accountId")
                .or_else(|| str_field(value, "account_id"))
                .or_else(|| str_field(value, "emailAddress"))
                .or_else(|| str_field(value, "email"))
                .or_else(|| str_field(value, "name"))?;
            Some(RemoteUser {
                identifier,
                display_name: str_field(value, "displayName")
                    .or_else(|| str_field(value, "display_name"))
                    .unwrap_or_default(),
                email: str_field(value, "emailAddress").or_else(|| str_field(value, "email")),
            })
        })
        .collect())
}

/// Parse a `jira_get_all_projects` payload into project keys.
pub fn parse_project_keys(payload: &Value) -> Result<Vec<String>, RemoteError> {
    let list = payload
        .get("projects")
        .and_then(Value::as_array)
        .or_else(|| payload.as_array())
        .ok_or_else(|| {
            RemoteError::ResponseShape("projects payload has no projects array".to_string())
        })?;

    Ok(list
        .iter()
        .filter_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            obj => str_field(obj, "key"),
        })
        .collect())
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
