// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn outcome_labels_are_stable() {
    assert_eq!(outcome_label(&Outcome::InSync), "in-sync");
    assert_eq!(outcome_label(&Outcome::Pushed), "pushed");
    assert_eq!(outcome_label(&Outcome::Pulled), "pulled");
    assert_eq!(outcome_label(&Outcome::Imported), "imported");
    assert_eq!(outcome_label(&Outcome::Resolved), "resolved");
    assert_eq!(
        outcome_label(&Outcome::Failed {
            message: "boom".to_string(),
            rate_limited: false,
        }),
        "failed: boom"
    );
    assert_eq!(
        outcome_label(&Outcome::DryRun("would push title".to_string())),
        "dry-run: would push title"
    );
}

#[test]
fn format_time_ago_buckets() {
    let now = chrono::Utc::now();
    assert_eq!(format_time_ago(now), "0s");
    assert_eq!(format_time_ago(now - chrono::Duration::seconds(59)), "59s");
    assert_eq!(format_time_ago(now - chrono::Duration::minutes(5)), "5m");
    assert_eq!(format_time_ago(now - chrono::Duration::hours(3)), "3h");
    assert_eq!(format_time_ago(now - chrono::Duration::days(2)), "2d");
    // Future timestamps clamp to zero
    assert_eq!(format_time_ago(now + chrono::Duration::minutes(5)), "0s");
}
