// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests of the stdio transport against a scripted stub
//! server. Request ids are deterministic per connection (initialize=1,
//! tools/list=2, first tool call=3), which the stubs rely on.

use super::*;
use serial_test::serial;

fn test_credentials() -> Credentials {
    Credentials::Cloud {
        base_url: "https://example.atlassian.net".to_string(),
        email: "alice@example.com".to_string(),
        api_token: "token123".to_string(),
    }
}

#[cfg(unix)]
fn stub_server(dir: &tempfile::TempDir, body: &str) -> ToolServerConfig {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("stub-server");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();

    ToolServerConfig {
        server_command: Some(vec![path.to_string_lossy().into_owned()]),
        fallback_to_docker: false,
        docker_image: "unused".to_string(),
        silent: false,
    }
    .silent()
}

/// A stub that handshakes cleanly and answers one jira_get_issue call.
#[cfg(unix)]
const HAPPY_SERVER: &str = r#"
while read -r line; do
  case "$line" in
    *'"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"serverInfo":{"name":"stub"}}}' ;;
    *'"tools/list"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}' ;;
    *'"jira_get_issue"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"{\"key\":\"PROJ-1\",\"summary\":\"Stubbed\",\"status\":{\"name\":\"Done\"}}"}]}}' ;;
  esac
done
"#;

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn connect_and_call_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = ToolServerAdapter::new(stub_server(&dir, HAPPY_SERVER), test_credentials());

    adapter.connect().await.unwrap();
    let issue = adapter.get_issue("PROJ-1").await.unwrap();
    assert_eq!(issue.key, "PROJ-1");
    assert_eq!(issue.summary, "Stubbed");
    assert_eq!(issue.status, "Done");

    adapter.close().await.unwrap();
    // close is idempotent
    adapter.close().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn connect_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = ToolServerAdapter::new(stub_server(&dir, HAPPY_SERVER), test_credentials());

    adapter.connect().await.unwrap();
    adapter.connect().await.unwrap();
    adapter.close().await.unwrap();
}

#[tokio::test]
async fn call_before_connect_is_not_ready() {
    let config = ToolServerConfig {
        server_command: None,
        fallback_to_docker: false,
        docker_image: "unused".to_string(),
        silent: true,
    };
    let adapter = ToolServerAdapter::new(config, test_credentials());
    let err = adapter.get_issue("PROJ-1").await.unwrap_err();
    assert!(matches!(err, RemoteError::NotReady(_)));
}

/// A stub whose tool registry never becomes ready: initialize succeeds
/// but tools/list always errors.
#[cfg(unix)]
const NEVER_READY_SERVER: &str = r#"
while read -r line; do
  case "$line" in
    *'"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{}}' ;;
    *'"tools/list"'*)
      id=$(printf '%s' "$line" | sed 's/.*"id"://;s/,.*//;s/}.*//')
      printf '{"jsonrpc":"2.0","id":%s,"error":{"code":-32000,"message":"still starting"}}\n' "$id" ;;
  esac
done
"#;

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn handshake_deadline_raises_not_ready() {
    std::env::set_var("TETHER_TIMEOUT_CONNECT_MS", "600");
    let dir = tempfile::tempdir().unwrap();
    let adapter =
        ToolServerAdapter::new(stub_server(&dir, NEVER_READY_SERVER), test_credentials());

    let err = adapter.connect().await.unwrap_err();
    assert!(matches!(err, RemoteError::NotReady(_)), "got: {err}");
    std::env::remove_var("TETHER_TIMEOUT_CONNECT_MS");
}

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn spawn_failure_without_fallback_propagates() {
    std::env::set_var("TETHER_TIMEOUT_CONNECT_MS", "600");
    let config = ToolServerConfig {
        server_command: Some(vec!["definitely-not-a-real-server-binary".to_string()]),
        fallback_to_docker: false,
        docker_image: "unused".to_string(),
        silent: true,
    };
    let adapter = ToolServerAdapter::new(config, test_credentials());
    let err = adapter.connect().await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)), "got: {err}");
    std::env::remove_var("TETHER_TIMEOUT_CONNECT_MS");
}

/// Tool errors surface as classified failures, not transport errors.
#[cfg(unix)]
const TOOL_ERROR_SERVER: &str = r#"
while read -r line; do
  case "$line" in
    *'"initialize"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{}}' ;;
    *'"tools/list"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}' ;;
    *'"tools/call"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"Error: 429 rate limit exceeded"}]}}' ;;
  esac
done
"#;

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn tool_error_text_is_classified() {
    let dir = tempfile::tempdir().unwrap();
    let adapter =
        ToolServerAdapter::new(stub_server(&dir, TOOL_ERROR_SERVER), test_credentials());

    adapter.connect().await.unwrap();
    let err = adapter.get_issue("PROJ-1").await.unwrap_err();
    assert!(err.is_rate_limited(), "got: {err}");
    adapter.close().await.unwrap();
}

/// Noisy server: emits log lines and an unrelated notification before
/// the real response.
#[cfg(unix)]
const NOISY_SERVER: &str = r#"
while read -r line; do
  case "$line" in
    *'"initialize"'*)
      echo 'starting up...'
      printf '%s\n' '{"jsonrpc":"2.0","method":"notifications/message","params":{}}'
      printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{}}' ;;
    *'"tools/list"'*)
      printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[]}}' ;;
  esac
done
"#;

#[cfg(unix)]
#[tokio::test]
#[serial]
async fn non_response_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let adapter = ToolServerAdapter::new(stub_server(&dir, NOISY_SERVER), test_credentials());
    adapter.connect().await.unwrap();
    adapter.close().await.unwrap();
}
