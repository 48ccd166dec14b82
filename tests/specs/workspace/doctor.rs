//! Environment checks.

use crate::prelude::*;

#[test]
fn doctor_reports_missing_pieces_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    // No workspace, no task CLI, no credentials
    cli()
        .args(&["doctor"])
        .pwd(dir.path())
        .run()
        .expect_failure()
        .expect_stdout("workspace")
        .expect_stdout("task CLI")
        .expect_stdout("credentials");
}

#[test]
fn doctor_sees_an_initialized_workspace() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init", "--project", "PROJ"])
        .pwd(dir.path())
        .run()
        .expect_success();

    let out = cli().args(&["doctor"]).pwd(dir.path()).run();
    // Workspace and config pass; task CLI and credentials still fail
    assert!(out.stdout().contains("project PROJ"), "{}", out.stdout());
    out.expect_failure();
}

#[test]
fn doctor_accepts_credentials_from_the_environment() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init"])
        .pwd(dir.path())
        .run()
        .expect_success();

    let out = cli()
        .args(&["doctor"])
        .pwd(dir.path())
        .env("BASE_URL", "https://example.atlassian.net")
        .env("EMAIL", "alice@example.com")
        .env("API_TOKEN", "token123")
        .run();
    assert!(
        out.stdout().contains("https://example.atlassian.net"),
        "{}",
        out.stdout()
    );
}
