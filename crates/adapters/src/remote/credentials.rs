// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential intake for the tool server.
//!
//! Validated before spawning so a misconfigured environment fails fast
//! with a message naming the missing variable, not a dead child process.

use super::RemoteError;

/// Environment variables read by the engine. The spawned server gets
/// its own spelling of these via [`Credentials::child_env`].
pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_EMAIL: &str = "EMAIL";
pub const ENV_API_TOKEN: &str = "API_TOKEN";
pub const ENV_PERSONAL_TOKEN: &str = "PERSONAL_TOKEN";

/// Proxy variables forwarded to the child verbatim when set.
const FORWARDED_ENV: &[&str] = &[
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
    "http_proxy",
    "https_proxy",
    "no_proxy",
];

/// A validated credential tuple: either cloud ({base URL, email, API
/// token}) or self-hosted ({base URL, personal token}).
#[derive(Debug, Clone)]
pub enum Credentials {
    Cloud {
        base_url: String,
        email: String,
        api_token: String,
    },
    SelfHosted {
        base_url: String,
        personal_token: String,
    },
}

impl Credentials {
    /// Read and validate credentials from the process environment.
    pub fn from_env() -> Result<Self, RemoteError> {
        let get = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let base_url = get(ENV_BASE_URL).ok_or_else(|| {
            RemoteError::Credentials(format!("{} is not set", ENV_BASE_URL))
        })?;

        if let Some(personal_token) = get(ENV_PERSONAL_TOKEN) {
            return Ok(Credentials::SelfHosted {
                base_url,
                personal_token,
            });
        }

        match (get(ENV_EMAIL), get(ENV_API_TOKEN)) {
            (Some(email), Some(api_token)) => Ok(Credentials::Cloud {
                base_url,
                email,
                api_token,
            }),
            (Some(_), None) => Err(RemoteError::Credentials(format!(
                "{} is set but {} is not",
                ENV_EMAIL, ENV_API_TOKEN
            ))),
            (None, Some(_)) => Err(RemoteError::Credentials(format!(
                "{} is set but {} is not",
                ENV_API_TOKEN, ENV_EMAIL
            ))),
            (None, None) => Err(RemoteError::Credentials(format!(
                "set either {} and {}, or {}",
                ENV_EMAIL, ENV_API_TOKEN, ENV_PERSONAL_TOKEN
            ))),
        }
    }

    pub fn base_url(&self) -> &str {
        match self {
            Credentials::Cloud { base_url, .. } => base_url,
            Credentials::SelfHosted { base_url, .. } => base_url,
        }
    }

    /// Environment handed to the spawned server, in the variable names
    /// the server expects, plus forwarded proxy settings.
    pub fn child_env(&self) -> Vec<(String, String)> {
        let mut env = match self {
            Credentials::Cloud {
                base_url,
                email,
                api_token,
            } => vec![
                ("JIRA_URL".to_string(), base_url.clone()),
                ("JIRA_USERNAME".to_string(), email.clone()),
                ("JIRA_API_TOKEN".to_string(), api_token.clone()),
            ],
            Credentials::SelfHosted {
                base_url,
                personal_token,
            } => vec![
                ("JIRA_URL".to_string(), base_url.clone()),
                ("JIRA_PERSONAL_TOKEN".to_string(), personal_token.clone()),
            ],
        };

        for name in FORWARDED_ENV {
            if let Ok(value) = std::env::var(name) {
                if !value.is_empty() {
                    env.push((name.to_string(), value));
                }
            }
        }
        env
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
