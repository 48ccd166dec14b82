// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! tether-engine: the reconciliation engine.
//!
//! Orchestrates push, pull, and bidirectional sync over the adapter
//! seams, detects and resolves field-level conflicts, establishes new
//! mappings, and drives the polling watch loop.

pub mod context;
pub mod error;
#[cfg(test)]
pub(crate) mod test_helpers;
pub mod mapper;
pub mod reconciler;
pub mod resolve;
pub mod transition;
pub mod watcher;

pub use context::SyncContext;
pub use error::EngineError;
pub use mapper::{CandidatePicker, MapOutcome, Mapper, PickOutcome, ScoredCandidate};
pub use reconciler::{unmap_task, MappingOutcome, Outcome, Reconciler, SyncReport};
pub use resolve::{ConflictPrompter, PromptOutcome};
pub use transition::find_transition;
pub use watcher::{next_backoff, WatchCounters, WatchOptions, Watcher};
