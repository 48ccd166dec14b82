// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_round_trips_through_json() {
    let config = SyncConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: SyncConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.batch_concurrency, 10);
    assert_eq!(back.conflict_strategy, ConflictStrategy::Prompt);
    assert_eq!(back.issue_type, "Task");
}

#[test]
fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = SyncConfig::default();
    config.project_key = Some("PROJ".to_string());
    config.jql_filter = Some("project = PROJ".to_string());
    config.save(&path).unwrap();

    let loaded = SyncConfig::load(&path).unwrap();
    assert_eq!(loaded.project_key.as_deref(), Some("PROJ"));
    assert_eq!(loaded.jql_filter.as_deref(), Some("project = PROJ"));
    // No temp file left behind
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn load_missing_is_actionable() {
    let dir = tempfile::tempdir().unwrap();
    let err = SyncConfig::load(&dir.path().join("config.json")).unwrap_err();
    assert!(err.to_string().contains("tether init"));
}

#[test]
fn load_invalid_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = SyncConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert!(err.to_string().contains("config.json"));
}

#[test]
fn unknown_keys_are_rejected_gracefully() {
    // Unknown keys are tolerated (serde default ignores them) so future
    // fields don't brick older binaries.
    let parsed: SyncConfig =
        serde_json::from_str(r#"{"conflictStrategy":"prefer-local","futureKnob":true}"#).unwrap();
    assert_eq!(parsed.conflict_strategy, ConflictStrategy::PreferLocal);
}

// ── status mapping ──────────────────────────────────────────────────

#[test]
fn remote_statuses_prefer_first_entry() {
    let config = SyncConfig::default();
    let statuses = config.remote_statuses_for("Done", None);
    assert_eq!(statuses[0], "Done");
    assert!(statuses.contains(&"Closed".to_string()));
}

#[test]
fn canonical_status_exact_beats_case_insensitive() {
    let mut config = SyncConfig::default();
    config
        .status_mapping
        .insert("Review".to_string(), vec!["done".to_string()]);
    // "Done" matches the Done list exactly; the lowercase alias in the
    // Review list must not win.
    assert_eq!(
        config.canonical_status_for_remote("Done", None).as_deref(),
        Some("Done")
    );
}

#[test]
fn canonical_status_falls_back_to_case_insensitive() {
    let config = SyncConfig::default();
    assert_eq!(
        config.canonical_status_for_remote("CLOSED", None).as_deref(),
        Some("Done")
    );
}

#[test]
fn project_overrides_shadow_defaults() {
    let mut config = SyncConfig::default();
    let mut overrides = ProjectOverrides::default();
    overrides
        .status_mapping
        .insert("Done".to_string(), vec!["Shipped".to_string()]);
    config
        .project_overrides
        .insert("PROJ".to_string(), overrides);

    assert_eq!(
        config.remote_statuses_for("Done", Some("PROJ")),
        vec!["Shipped".to_string()]
    );
    // Other projects keep the defaults
    assert_eq!(config.remote_statuses_for("Done", Some("OTHER"))[0], "Done");
}

// ── priority mapping ────────────────────────────────────────────────

#[test]
fn remote_priority_is_first_configured_alias() {
    let config = SyncConfig::default();
    assert_eq!(
        config.remote_priority_for(Priority::High, None).as_deref(),
        Some("High")
    );
}

#[test]
fn canonical_priority_is_case_insensitive() {
    let config = SyncConfig::default();
    assert_eq!(
        config.canonical_priority_for_remote("lowest", None),
        Some(Priority::Low)
    );
    assert_eq!(config.canonical_priority_for_remote("Blocker", None), None);
}

// ── assignees ───────────────────────────────────────────────────────

#[test]
fn explicit_assignee_shadows_auto() {
    let mut config = SyncConfig::default();
    config
        .auto_mapped_assignees
        .insert("alice".to_string(), "wrong@example.com".to_string());
    config
        .assignee_mapping
        .insert("alice".to_string(), "alice@example.com".to_string());

    assert_eq!(
        config.remote_assignee_for("alice"),
        Some("alice@example.com")
    );
}

#[test]
fn auto_assignee_used_when_no_explicit() {
    let mut config = SyncConfig::default();
    config
        .auto_mapped_assignees
        .insert("bob".to_string(), "bob@example.com".to_string());
    assert_eq!(config.remote_assignee_for("bob"), Some("bob@example.com"));
    assert_eq!(config.remote_assignee_for("carol"), None);
}

#[test]
fn local_assignee_reverse_lookup() {
    let mut config = SyncConfig::default();
    config
        .assignee_mapping
        .insert("alice".to_string(), "alice@example.com".to_string());
    assert_eq!(
        config.local_assignee_for("Alice@Example.com"),
        Some("alice")
    );
    assert_eq!(config.local_assignee_for("nobody@example.com"), None);
}

// ── intervals ───────────────────────────────────────────────────────

#[yare::parameterized(
    seconds = { "60s", 60 },
    minutes = { "5m", 300 },
    hours = { "1h", 3600 },
    bare_number = { "45", 45 },
    padded = { " 30s ", 30 },
)]
fn parse_interval_valid(input: &str, expected_secs: u64) {
    assert_eq!(
        parse_interval(input).unwrap(),
        Duration::from_secs(expected_secs)
    );
}

#[yare::parameterized(
    empty = { "" },
    zero = { "0s" },
    bad_unit = { "10x" },
    no_digits = { "ms" },
)]
fn parse_interval_invalid(input: &str) {
    assert!(parse_interval(input).is_err());
}
