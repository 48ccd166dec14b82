//! Help and version output.

use crate::prelude::*;

#[test]
fn help_lists_core_commands() {
    let out = cli().args(&["--help"]).run().expect_success();
    for command in ["push", "pull", "sync", "watch", "map", "status"] {
        assert!(
            out.stdout().contains(command),
            "help missing {command}: {}",
            out.stdout()
        );
    }
}

#[test]
fn version_prints_and_exits_zero() {
    cli()
        .args(&["--version"])
        .run()
        .expect_success()
        .expect_stdout("tether");
}

#[test]
fn subcommand_help_shows_flags() {
    cli()
        .args(&["push", "--help"])
        .run()
        .expect_success()
        .expect_stdout("--dry-run")
        .expect_stdout("--force");
}

#[test]
fn sync_help_shows_strategy() {
    cli()
        .args(&["sync", "--help"])
        .run()
        .expect_success()
        .expect_stdout("--strategy");
}
