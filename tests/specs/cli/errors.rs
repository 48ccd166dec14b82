//! Error paths: unknown commands, missing workspace, missing
//! credentials.

use crate::prelude::*;

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["frobnicate"]).run().expect_failure();
}

#[test]
fn push_without_workspace_points_at_init() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["push"])
        .pwd(dir.path())
        .run()
        .expect_failure()
        .expect_stderr("tether init");
}

#[test]
fn push_without_credentials_names_the_variable() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init"])
        .pwd(dir.path())
        .run()
        .expect_success();
    cli()
        .args(&["push"])
        .pwd(dir.path())
        .run()
        .expect_failure()
        .expect_stderr("BASE_URL");
}

#[test]
fn view_of_unknown_mapping_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init"])
        .pwd(dir.path())
        .run()
        .expect_success();
    cli()
        .args(&["view", "task-404"])
        .pwd(dir.path())
        .run()
        .expect_failure()
        .expect_stderr("no mapping");
}

#[test]
fn unmap_of_unknown_mapping_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(&["init"])
        .pwd(dir.path())
        .run()
        .expect_success();
    cli()
        .args(&["unmap", "task-404"])
        .pwd(dir.path())
        .run()
        .expect_failure()
        .expect_stderr("no mapping");
}

#[test]
fn dash_c_with_missing_directory_fails() {
    cli()
        .args(&["-C", "/definitely/not/a/real/path", "status"])
        .run()
        .expect_failure()
        .expect_stderr("cannot change to directory");
}
