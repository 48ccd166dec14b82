// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tether_core::ConflictField;

// ── truncation ──────────────────────────────────────────────────────

#[yare::parameterized(
    short_unchanged = { "hello", "hello" },
    empty_is_marked = { "", "(empty)" },
    multiline_shows_first_line = { "first line\nsecond line", "first line…" },
)]
fn truncate_value_cases(input: &str, expected: &str) {
    assert_eq!(truncate_value(input, 70), expected);
}

#[test]
fn truncate_value_caps_at_width() {
    let long = "x".repeat(100);
    let out = truncate_value(&long, 70);
    assert_eq!(out.chars().count(), 71); // 70 chars + ellipsis
    assert!(out.ends_with('…'));
}

// ── persistence offer ───────────────────────────────────────────────

fn resolution(local: usize, remote: usize, manual: usize) -> Resolution {
    let mut choices = Vec::new();
    let fields = ConflictField::ALL;
    let mut index = 0;
    for _ in 0..local {
        choices.push((fields[index % fields.len()], FieldChoice::Local));
        index += 1;
    }
    for _ in 0..remote {
        choices.push((fields[index % fields.len()], FieldChoice::Remote));
        index += 1;
    }
    for _ in 0..manual {
        choices.push((
            fields[index % fields.len()],
            FieldChoice::Manual("x".to_string()),
        ));
        index += 1;
    }
    Resolution { choices }
}

#[yare::parameterized(
    all_local = { 3, 0, Some(ConflictStrategy::PreferLocal) },
    all_remote = { 0, 2, Some(ConflictStrategy::PreferRemote) },
    two_to_one_local = { 2, 1, Some(ConflictStrategy::PreferLocal) },
    even_split = { 1, 1, None },
    three_to_two = { 3, 2, None },
)]
fn persistence_threshold(local: usize, remote: usize, expected: Option<ConflictStrategy>) {
    assert_eq!(persistence_candidate(&resolution(local, remote, 0)), expected);
}

#[test]
fn manual_choices_do_not_count_toward_persistence() {
    assert_eq!(persistence_candidate(&resolution(0, 0, 4)), None);
    assert_eq!(
        persistence_candidate(&resolution(2, 1, 3)),
        Some(ConflictStrategy::PreferLocal)
    );
}
