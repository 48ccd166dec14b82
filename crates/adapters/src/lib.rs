// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! tether-adapters: external I/O for the sync engine.
//!
//! Three surfaces: the local `task` CLI (subprocess per call), the remote
//! tool-protocol server (one long-lived subprocess), and the frontmatter
//! metadata block (the single permitted direct task-file write).

pub mod frontmatter;
pub mod local;
pub mod remote;

pub use frontmatter::{FrontmatterError, SyncMetadata};
pub use local::{CliLocalAdapter, LocalAdapter, LocalError};
pub use remote::{
    Credentials, IssueFields, RemoteAdapter, RemoteError, SearchPage, ToolServerAdapter,
    ToolServerConfig,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use local::{FakeLocalAdapter, LocalCall};
#[cfg(any(test, feature = "test-support"))]
pub use remote::{FakeRemoteAdapter, RemoteCall};
