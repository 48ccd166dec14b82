//! Behavioral specifications for the tether CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes. Anything that needs a live tool
//! server or the real `task` CLI is covered by the engine's fake-adapter
//! tests instead.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

#[path = "specs/workspace/doctor.rs"]
mod workspace_doctor;
#[path = "specs/workspace/init.rs"]
mod workspace_init;
#[path = "specs/workspace/status.rs"]
mod workspace_status;
