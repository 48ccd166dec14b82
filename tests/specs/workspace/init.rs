//! Workspace scaffolding.

use crate::prelude::*;

#[test]
fn init_creates_the_state_layout() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init", "--project", "PROJ"])
        .pwd(dir.path())
        .run()
        .expect_success()
        .expect_stdout("Initialized");

    let state = dir.path().join(".tether");
    assert!(state.join("config.json").is_file());
    assert!(state.join("mappings").is_dir());
    assert!(state.join("snapshots").is_dir());
    assert!(state.join(".gitignore").is_file());

    let config = std::fs::read_to_string(state.join("config.json")).unwrap();
    assert!(config.contains("\"projectKey\": \"PROJ\""));
}

#[test]
fn init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    cli().args(&["init"]).pwd(dir.path()).run().expect_success();
    cli()
        .args(&["init"])
        .pwd(dir.path())
        .run()
        .expect_success()
        .expect_stdout("Already initialized");
}

#[test]
fn reinit_with_flags_updates_config_only() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init", "--project", "PROJ"])
        .pwd(dir.path())
        .run()
        .expect_success();
    cli()
        .args(&["init", "--jql", "project = PROJ AND labels = sync"])
        .pwd(dir.path())
        .run()
        .expect_success()
        .expect_stdout("Updated");

    let config =
        std::fs::read_to_string(dir.path().join(".tether/config.json")).unwrap();
    assert!(config.contains("\"projectKey\": \"PROJ\""));
    assert!(config.contains("labels = sync"));
}

#[test]
fn commands_find_the_workspace_from_a_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    cli().args(&["init"]).pwd(dir.path()).run().expect_success();

    let sub = dir.path().join("tasks/nested");
    std::fs::create_dir_all(&sub).unwrap();
    cli()
        .args(&["status"])
        .pwd(&sub)
        .run()
        .expect_success()
        .expect_stdout("No mappings");
}
