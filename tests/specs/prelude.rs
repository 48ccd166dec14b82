//! Test helpers for behavioral specifications.
//!
//! Provides a small fluent builder for running the tether binary with a
//! scrubbed environment.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Credential variables scrubbed from every spec run so the host
/// environment can't leak into assertions.
const SCRUBBED_ENV: &[&str] = &[
    "BASE_URL",
    "EMAIL",
    "API_TOKEN",
    "PERSONAL_TOKEN",
    "LOG_LEVEL",
];

/// Returns the path to the tether binary, working with both standard
/// builds and llvm-cov coverage runs. Falls back to resolving relative
/// to the test binary itself when CARGO_MANIFEST_DIR is stale.
fn tether_binary() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug/tether");
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug/tether");
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>; its
    // grandparent is target/debug/ where tether is built.
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("tether");
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Create a CLI builder for tether commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                // Point the local adapter at a binary that never exists,
                // so specs fail fast instead of touching a real task CLI.
                (
                    "TETHER_TASK_BIN".into(),
                    "tether-spec-missing-task-cli".into(),
                ),
                ("NO_COLOR".into(), "1".into()),
            ],
        }
    }

    /// Add CLI arguments.
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set the working directory.
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set an environment variable for the run.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    /// Run and capture output.
    pub fn run(self) -> SpecOutput {
        let mut cmd = Command::new(tether_binary());
        cmd.args(&self.args);
        for name in SCRUBBED_ENV {
            cmd.env_remove(name);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        let output = cmd.output().expect("failed to run tether binary");
        SpecOutput { output }
    }
}

/// Captured output with assertion helpers.
pub struct SpecOutput {
    output: Output,
}

impl SpecOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> i32 {
        self.output.status.code().unwrap_or(-1)
    }

    pub fn expect_success(self) -> Self {
        assert_eq!(
            self.code(),
            0,
            "expected exit 0\nstdout: {}\nstderr: {}",
            self.stdout(),
            self.stderr(),
        );
        self
    }

    pub fn expect_failure(self) -> Self {
        assert_ne!(
            self.code(),
            0,
            "expected non-zero exit\nstdout: {}",
            self.stdout(),
        );
        self
    }

    pub fn expect_stdout(self, needle: &str) -> Self {
        assert!(
            self.stdout().contains(needle),
            "stdout missing {:?}\nstdout: {}",
            needle,
            self.stdout(),
        );
        self
    }

    pub fn expect_stderr(self, needle: &str) -> Self {
        assert!(
            self.stderr().contains(needle),
            "stderr missing {:?}\nstderr: {}",
            needle,
            self.stderr(),
        );
        self
    }
}
