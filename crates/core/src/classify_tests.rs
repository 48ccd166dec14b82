// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

// The full classification table. "h" is the base hash; "x"/"y" are
// changed hashes on the local/remote side.
#[yare::parameterized(
    in_sync = { "h", "h", Some("h"), Some("h"), SyncState::InSync },
    needs_push = { "x", "h", Some("h"), Some("h"), SyncState::NeedsPush },
    needs_pull = { "h", "y", Some("h"), Some("h"), SyncState::NeedsPull },
    conflict = { "x", "y", Some("h"), Some("h"), SyncState::Conflict },
    missing_local_snapshot = { "h", "h", None, Some("h"), SyncState::Unknown },
    missing_remote_snapshot = { "h", "h", Some("h"), None, SyncState::Unknown },
    missing_both_snapshots = { "x", "y", None, None, SyncState::Unknown },
    unknown_wins_over_changes = { "x", "y", None, Some("h"), SyncState::Unknown },
)]
fn classification_table(
    current_local: &str,
    current_remote: &str,
    snap_local: Option<&str>,
    snap_remote: Option<&str>,
    expected: SyncState,
) {
    assert_eq!(
        classify_sync_state(current_local, current_remote, snap_local, snap_remote),
        expected
    );
}

#[test]
fn classification_is_pure() {
    for _ in 0..3 {
        assert_eq!(
            classify_sync_state("a", "b", Some("a"), Some("a")),
            SyncState::NeedsPull
        );
    }
}

#[test]
fn display_names_are_kebab_case() {
    assert_eq!(SyncState::InSync.to_string(), "in-sync");
    assert_eq!(SyncState::NeedsPush.to_string(), "needs-push");
    assert_eq!(SyncState::NeedsPull.to_string(), "needs-pull");
    assert_eq!(SyncState::Conflict.to_string(), "conflict");
    assert_eq!(SyncState::Unknown.to_string(), "unknown");
}
