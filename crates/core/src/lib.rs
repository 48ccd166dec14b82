// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether-core: data model, normalization, and sync-state classification
//! for the tether task↔issue synchronization sidecar.

pub mod classify;
pub mod config;
pub mod conflict;
pub mod issue;
pub mod normalize;
pub mod payload;
pub mod similarity;
pub mod task;

pub use classify::{classify_sync_state, SyncState};
pub use config::{ConfigError, ConflictStrategy, SyncConfig};
pub use conflict::{
    detect_field_conflicts, field_value, ConflictField, FieldChoice, FieldConflict, Resolution,
};
pub use issue::{RemoteIssue, RemoteUser, Transition};
pub use normalize::{
    extract_sections, normalize_local, normalize_remote, render_remote_description,
    sanitize_title, DescriptionSections,
};
pub use payload::{payload_hash, AcItem, NormalizedPayload};
pub use similarity::{name_similarity, title_score};
pub use task::{AcceptanceCriterion, NewTask, Priority, Task, TaskFilter, TaskUpdate};
