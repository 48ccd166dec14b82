// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether-storage: durable workspace-local persistence for mappings,
//! snapshots, and the operations audit log.

pub mod oplog;
pub mod store;

pub use oplog::{OpLogEntry, OpStatus, Operation};
pub use store::{Mapping, MappingStore, Side, StoreError, StoredSnapshot, STATE_DIR};
