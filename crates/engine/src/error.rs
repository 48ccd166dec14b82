// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;

use tether_adapters::{FrontmatterError, LocalError, RemoteError};
use tether_core::ConfigError;
use tether_storage::StoreError;

/// Errors that can occur while reconciling.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("local adapter: {0}")]
    Local(#[from] LocalError),
    #[error("remote adapter: {0}")]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    #[error("no mapping for {0} (run `tether map` first)")]
    NotMapped(String),
    #[error("{local_id} is already mapped to {remote_key} (use --force to replace)")]
    AlreadyMapped { local_id: String, remote_key: String },
    #[error("{remote_key} is already mapped to {local_id} (use --force to replace)")]
    RemoteAlreadyMapped { remote_key: String, local_id: String },
    #[error("{local_id}: {reason}")]
    Refused { local_id: String, reason: String },
    #[error("invalid {field} value '{value}': {message}")]
    InvalidFieldValue {
        field: String,
        value: String,
        message: String,
    },
    #[error("watch mode does not support the prompt strategy; use prefer-local, prefer-remote, or manual")]
    PromptInWatch,
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl EngineError {
    /// True when the underlying failure is remote rate limiting; the
    /// watcher applies the long backoff for these.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            EngineError::Remote(e) => e.is_rate_limited(),
            _ => false,
        }
    }
}
