// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The polling watch loop.
//!
//! Each cycle runs one bidirectional sync across all mappings (batched
//! by the reconciler). Failing cycles back off exponentially; rate
//! limiting gets the long base. A wholly clean cycle resets the backoff.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{info, warn};

use tether_adapters::{LocalAdapter, RemoteAdapter};
use tether_core::ConflictStrategy;

use crate::error::EngineError;
use crate::reconciler::{Reconciler, SyncReport};

/// Base backoff after a cycle with transport-class errors.
const BACKOFF_BASE: Duration = Duration::from_secs(2);
/// Base backoff after a rate-limited cycle.
const BACKOFF_RATE_LIMITED: Duration = Duration::from_secs(30);
/// Backoff ceiling.
const BACKOFF_MAX: Duration = Duration::from_secs(300);

/// Watch-loop configuration.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Unattended conflict handling; `prompt` is rejected.
    pub strategy: ConflictStrategy,
    pub stop_on_error: bool,
    /// Restrict the loop to these mappings (local ids or remote keys).
    pub selection: Option<Vec<String>>,
}

/// Counters across the life of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchCounters {
    pub cycles: u64,
    pub synced: u64,
    pub conflicts: u64,
    pub errors: u64,
}

/// Compute the next backoff delay.
///
/// Pure so the growth schedule is testable: the first failing cycle
/// starts at the class base, consecutive failures double, the cap wins
/// eventually, and a rate-limited failure never shrinks the delay below
/// its long base.
pub fn next_backoff(previous: Option<Duration>, rate_limited: bool) -> Duration {
    let base = if rate_limited {
        BACKOFF_RATE_LIMITED
    } else {
        BACKOFF_BASE
    };
    let next = match previous {
        None => base,
        Some(prev) => prev.saturating_mul(2).max(base),
    };
    next.min(BACKOFF_MAX)
}

/// The polling scheduler.
pub struct Watcher<L: LocalAdapter, R: RemoteAdapter> {
    reconciler: Reconciler<L, R>,
    options: WatchOptions,
}

impl<L: LocalAdapter, R: RemoteAdapter> Watcher<L, R> {
    pub fn new(reconciler: Reconciler<L, R>, options: WatchOptions) -> Result<Self, EngineError> {
        if options.strategy == ConflictStrategy::Prompt {
            return Err(EngineError::PromptInWatch);
        }
        Ok(Self {
            reconciler,
            options,
        })
    }

    /// Run until `shutdown` fires (or `stop_on_error` trips). The
    /// in-flight cycle always finishes before the loop exits.
    pub async fn run(
        &self,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Result<WatchCounters, EngineError> {
        let mut counters = WatchCounters::default();
        let mut backoff: Option<Duration> = None;

        loop {
            let selection = self.options.selection.as_deref();
            let cycle = self
                .reconciler
                .sync(selection, Some(self.options.strategy), None)
                .await;

            counters.cycles += 1;
            let cycle_failed = match cycle {
                Ok(report) => {
                    counters.synced += report.synced_count() as u64;
                    counters.conflicts += report.conflict_count() as u64;
                    counters.errors += report.error_count() as u64;
                    self.log_cycle(&counters, &report);

                    if report.error_count() > 0 {
                        backoff = Some(next_backoff(backoff, report.rate_limited()));
                        true
                    } else {
                        backoff = None;
                        false
                    }
                }
                Err(e) => {
                    counters.errors += 1;
                    warn!(error = %e, "sync cycle failed");
                    backoff = Some(next_backoff(backoff, e.is_rate_limited()));
                    true
                }
            };

            if cycle_failed && self.options.stop_on_error {
                return Ok(counters);
            }

            let delay = backoff.unwrap_or(self.options.interval);
            tokio::select! {
                _ = sleep(delay) => {}
                _ = &mut shutdown => {
                    info!(
                        cycles = counters.cycles,
                        synced = counters.synced,
                        conflicts = counters.conflicts,
                        errors = counters.errors,
                        "watch interrupted, exiting",
                    );
                    return Ok(counters);
                }
            }
        }
    }

    fn log_cycle(&self, counters: &WatchCounters, report: &SyncReport) {
        info!(
            cycle = counters.cycles,
            mappings = report.results.len(),
            synced = report.synced_count(),
            conflicts = report.conflict_count(),
            errors = report.error_count(),
            "sync cycle complete",
        );
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
