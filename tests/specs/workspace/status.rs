//! Offline status output.

use crate::prelude::*;

#[test]
fn status_with_no_mappings_hints_at_map() {
    let dir = tempfile::tempdir().unwrap();
    cli().args(&["init"]).pwd(dir.path()).run().expect_success();
    cli()
        .args(&["status"])
        .pwd(dir.path())
        .run()
        .expect_success()
        .expect_stdout("No mappings");
}

#[test]
fn status_lists_stored_mappings_without_a_remote() {
    let dir = tempfile::tempdir().unwrap();
    cli().args(&["init"]).pwd(dir.path()).run().expect_success();

    // Seed a mapping file directly; status must not need the tracker.
    let mapping = serde_json::json!({
        "local_id": "task-1",
        "remote_key": "PROJ-1",
        "created_at": "2026-01-02T03:04:05Z",
        "updated_at": "2026-01-02T03:04:05Z",
    });
    std::fs::write(
        dir.path().join(".tether/mappings/task-1.json"),
        serde_json::to_string_pretty(&mapping).unwrap(),
    )
    .unwrap();

    cli()
        .args(&["status"])
        .pwd(dir.path())
        .run()
        .expect_success()
        .expect_stdout("task-1")
        .expect_stdout("PROJ-1")
        .expect_stdout("never");
}

#[test]
fn status_renders_json() {
    let dir = tempfile::tempdir().unwrap();
    cli().args(&["init"]).pwd(dir.path()).run().expect_success();

    let out = cli()
        .args(&["status", "-o", "json"])
        .pwd(dir.path())
        .run()
        .expect_success();
    let parsed: serde_json::Value = serde_json::from_str(&out.stdout()).unwrap();
    assert!(parsed.as_array().unwrap().is_empty());
}
