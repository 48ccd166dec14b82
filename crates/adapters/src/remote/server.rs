// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The long-lived tool-server subprocess.
//!
//! One adapter instance = one child. The stdio channel is a single
//! request/response stream, so calls are serialized behind an async
//! mutex; concurrent callers queue in lock order.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use tether_core::{RemoteIssue, RemoteUser, SyncConfig, Transition};

use super::credentials::Credentials;
use super::wire::{self, RpcRequest};
use super::{IssueFields, RemoteAdapter, RemoteError, SearchPage};

/// Default handshake window; the adapter raises `NotReady` on expiry.
/// Overridable via `TETHER_TIMEOUT_CONNECT_MS` (tests use short values).
const HANDSHAKE_TIMEOUT_MS: u64 = 5000;
/// Cadence of `tools/list` readiness polls inside the handshake window.
const HANDSHAKE_POLL: Duration = Duration::from_millis(250);
/// Grace period for the child to exit after stdin closes.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

fn handshake_timeout() -> Duration {
    let ms = std::env::var("TETHER_TIMEOUT_CONNECT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(HANDSHAKE_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Transport configuration for the tool server.
#[derive(Debug, Clone)]
pub struct ToolServerConfig {
    /// External server command (binary + args). Fast path.
    pub server_command: Option<Vec<String>>,
    /// Fall back to the containerized transport when the external
    /// command fails to connect.
    pub fallback_to_docker: bool,
    pub docker_image: String,
    /// Suppress informational spawn/retry logs (used by connectivity
    /// probes); the final failure still surfaces.
    pub silent: bool,
}

impl ToolServerConfig {
    pub fn from_sync_config(config: &SyncConfig) -> Self {
        Self {
            server_command: config.server_command.clone(),
            fallback_to_docker: config.fallback_to_docker,
            docker_image: config.docker_image.clone(),
            silent: false,
        }
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

struct Connection {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl Connection {
    /// One serialized request/response round trip. Lines that are not
    /// responses to this request (notifications, stray logging) are
    /// skipped.
    async fn round_trip(&mut self, method: &str, params: Value) -> Result<Value, RemoteError> {
        self.next_id += 1;
        let id = self.next_id;

        let line = RpcRequest::call(id, method, params).encode()?;
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        loop {
            let mut buf = String::new();
            let read = self.stdout.read_line(&mut buf).await?;
            if read == 0 {
                return Err(RemoteError::Transport(
                    "tool server closed its stdout".to_string(),
                ));
            }
            let Some(response) = wire::decode_response(&buf) else {
                debug!(line = %buf.trim(), "skipping non-response line from tool server");
                continue;
            };
            if response.id != Some(id) {
                continue;
            }
            if let Some(error) = response.error {
                return Err(RemoteError::Protocol(format!(
                    "{} (code {})",
                    error.message, error.code
                )));
            }
            return response.result.ok_or_else(|| {
                RemoteError::Protocol("response carries neither result nor error".to_string())
            });
        }
    }

    async fn notify(&mut self, method: &str) -> Result<(), RemoteError> {
        let line = RpcRequest::notification(method).encode()?;
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }
}

struct Inner {
    config: ToolServerConfig,
    credentials: Credentials,
    conn: tokio::sync::Mutex<Option<Connection>>,
}

/// The real subprocess-backed remote adapter.
#[derive(Clone)]
pub struct ToolServerAdapter {
    inner: Arc<Inner>,
}

impl ToolServerAdapter {
    /// Validate credentials and build the adapter. No subprocess is
    /// spawned until [`RemoteAdapter::connect`].
    pub fn new(config: ToolServerConfig, credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                credentials,
                conn: tokio::sync::Mutex::new(None),
            }),
        }
    }

    /// Build from the environment, failing fast on a missing credential
    /// tuple.
    pub fn from_env(config: ToolServerConfig) -> Result<Self, RemoteError> {
        let credentials = Credentials::from_env()?;
        Ok(Self::new(config, credentials))
    }

    fn docker_command(&self) -> Vec<String> {
        let mut cmd = vec![
            "docker".to_string(),
            "run".to_string(),
            "-i".to_string(),
            "--rm".to_string(),
        ];
        for (name, _) in self.inner.credentials.child_env() {
            cmd.push("-e".to_string());
            cmd.push(name);
        }
        cmd.push(self.inner.config.docker_image.clone());
        cmd
    }

    async fn spawn_and_handshake(&self, command: &[String]) -> Result<Connection, RemoteError> {
        let program = command
            .first()
            .ok_or_else(|| RemoteError::Transport("empty server command".to_string()))?;

        if !self.inner.config.silent {
            info!(command = %command.join(" "), "spawning tool server");
        }

        let mut cmd = Command::new(program);
        cmd.args(&command[1..])
            .envs(self.inner.credentials.child_env())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| RemoteError::Transport(format!("failed to spawn {}: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RemoteError::Transport("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| RemoteError::Transport("child stdout unavailable".to_string()))?;

        let mut conn = Connection {
            child,
            stdin,
            stdout,
            next_id: 0,
        };

        let window = handshake_timeout();
        let deadline = Instant::now() + window;

        let init_params = json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "tether", "version": env!("CARGO_PKG_VERSION") },
        });
        timeout_at(deadline, conn.round_trip("initialize", init_params))
            .await
            .map_err(|e| not_ready(e, "initialize"))?;
        conn.notify("notifications/initialized").await?;

        // The server may accept initialize before its tool registry is
        // usable. Poll listTools until it answers cleanly.
        loop {
            match timeout_at(deadline, conn.round_trip("tools/list", json!({}))).await {
                Ok(_) => break,
                Err(RemoteError::NotReady(msg)) => {
                    return Err(RemoteError::NotReady(msg));
                }
                Err(e) => {
                    if Instant::now() + HANDSHAKE_POLL >= deadline {
                        return Err(RemoteError::NotReady(format!(
                            "listTools did not succeed within {}ms: {}",
                            window.as_millis(),
                            e
                        )));
                    }
                    if !self.inner.config.silent {
                        debug!(error = %e, "tool server not ready yet, retrying listTools");
                    }
                    sleep(HANDSHAKE_POLL).await;
                }
            }
        }

        Ok(conn)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<String, RemoteError> {
        let mut guard = self.inner.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(|| {
            RemoteError::NotReady("call_tool before connect completed".to_string())
        })?;

        let result = conn
            .round_trip("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        wire::extract_tool_text(&result)
    }

    async fn call_tool_json(&self, name: &str, arguments: Value) -> Result<Value, RemoteError> {
        let text = self.call_tool(name, arguments).await?;
        wire::parse_json_payload(&text)
    }
}

/// Run a handshake step against the shared deadline, mapping expiry to
/// `NotReady`.
async fn timeout_at<T>(
    deadline: Instant,
    fut: impl std::future::Future<Output = Result<T, RemoteError>>,
) -> Result<T, RemoteError> {
    match timeout(deadline.saturating_duration_since(Instant::now()), fut).await {
        Ok(result) => result,
        Err(_elapsed) => Err(RemoteError::NotReady(
            "handshake deadline expired".to_string(),
        )),
    }
}

fn not_ready(err: RemoteError, step: &str) -> RemoteError {
    match err {
        RemoteError::NotReady(msg) => RemoteError::NotReady(msg),
        other => RemoteError::NotReady(format!("{} failed: {}", step, other)),
    }
}

#[async_trait]
impl RemoteAdapter for ToolServerAdapter {
    async fn connect(&self) -> Result<(), RemoteError> {
        let mut guard = self.inner.conn.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let conn = match &self.inner.config.server_command {
            Some(command) => match self.spawn_and_handshake(command).await {
                Ok(conn) => conn,
                Err(e) if self.inner.config.fallback_to_docker => {
                    warn!(error = %e, "external tool server failed, falling back to docker");
                    self.spawn_and_handshake(&self.docker_command()).await?
                }
                Err(e) => return Err(e),
            },
            None => self.spawn_and_handshake(&self.docker_command()).await?,
        };

        *guard = Some(conn);
        Ok(())
    }

    async fn search_issues(
        &self,
        jql: &str,
        max_results: usize,
        start_at: usize,
    ) -> Result<SearchPage, RemoteError> {
        let payload = self
            .call_tool_json(
                "jira_search",
                json!({ "jql": jql, "maxResults": max_results, "startAt": start_at }),
            )
            .await?;
        wire::parse_search_page(&payload)
    }

    async fn get_issue(&self, key: &str) -> Result<RemoteIssue, RemoteError> {
        let payload = self
            .call_tool_json("jira_get_issue", json!({ "issue_key": key }))
            .await?;
        wire::parse_issue(&payload)
    }

    async fn update_issue(&self, key: &str, fields: &IssueFields) -> Result<(), RemoteError> {
        if fields.is_empty() {
            return Ok(());
        }
        self.call_tool(
            "jira_update_issue",
            json!({ "issue_key": key, "fields": fields.to_value() }),
        )
        .await?;
        Ok(())
    }

    async fn create_issue(
        &self,
        project: &str,
        issue_type: &str,
        summary: &str,
        additional_fields: &IssueFields,
    ) -> Result<RemoteIssue, RemoteError> {
        let payload = self
            .call_tool_json(
                "jira_create_issue",
                json!({
                    "project_key": project,
                    "issue_type": issue_type,
                    "summary": summary,
                    "additional_fields": additional_fields.to_value(),
                }),
            )
            .await?;

        // Some servers answer with a bare key/id stub instead of the full
        // issue. Fall back to the request's own values rather than
        // dereferencing fields that are not there.
        match wire::parse_issue(&payload) {
            Ok(issue) => Ok(issue),
            Err(RemoteError::ResponseShape(shape_err)) => {
                let key = payload
                    .get("key")
                    .and_then(Value::as_str)
                    .or_else(|| {
                        payload
                            .get("issue")
                            .and_then(|i| i.get("key"))
                            .and_then(Value::as_str)
                    })
                    .ok_or(RemoteError::ResponseShape(shape_err))?;
                warn!(
                    key = %key,
                    "created-issue response missing fields, falling back to request values",
                );
                Ok(RemoteIssue {
                    key: key.to_string(),
                    summary: summary.to_string(),
                    description: additional_fields.description.clone().unwrap_or_default(),
                    status: String::new(),
                    assignee: additional_fields.assignee.clone(),
                    labels: additional_fields.labels.clone().unwrap_or_default(),
                    priority: additional_fields.priority_name.clone(),
                    issue_type: Some(issue_type.to_string()),
                    ..RemoteIssue::default()
                })
            }
            Err(other) => Err(other),
        }
    }

    async fn get_transitions(&self, key: &str) -> Result<Vec<Transition>, RemoteError> {
        let payload = self
            .call_tool_json("jira_get_transitions", json!({ "issue_key": key }))
            .await?;
        wire::parse_transitions(&payload)
    }

    async fn transition_issue(
        &self,
        key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<(), RemoteError> {
        let mut args = json!({ "issue_key": key, "transition_id": transition_id });
        if let Some(comment) = comment {
            args["comment"] = Value::String(comment.to_string());
        }
        self.call_tool("jira_transition_issue", args).await?;
        Ok(())
    }

    async fn add_comment(&self, key: &str, body: &str) -> Result<(), RemoteError> {
        self.call_tool("jira_add_comment", json!({ "issue_key": key, "comment": body }))
            .await?;
        Ok(())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<RemoteUser>, RemoteError> {
        let payload = self
            .call_tool_json("jira_search_user", json!({ "query": query }))
            .await?;
        wire::parse_users(&payload)
    }

    async fn get_all_projects(&self) -> Result<Vec<String>, RemoteError> {
        let payload = self.call_tool_json("jira_get_all_projects", json!({})).await?;
        wire::parse_project_keys(&payload)
    }

    async fn close(&self) -> Result<(), RemoteError> {
        let mut guard = self.inner.conn.lock().await;
        let Some(conn) = guard.take() else {
            return Ok(());
        };

        let Connection {
            mut child, stdin, ..
        } = conn;
        // Closing stdin signals shutdown; give the child a grace period
        // before killing it.
        drop(stdin);
        if timeout(SHUTDOWN_TIMEOUT, child.wait()).await.is_err() {
            warn!("tool server did not exit after stdin close, killing");
            let _ = child.kill().await;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
