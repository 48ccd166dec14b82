// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;

use tether_engine::{MappingOutcome, Outcome, SyncReport};

use crate::color;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a timestamp as relative time (e.g., "5s", "2m", "1h", "3d")
pub fn format_time_ago(then: chrono::DateTime<chrono::Utc>) -> String {
    let elapsed_secs = (chrono::Utc::now() - then).num_seconds().max(0) as u64;
    if elapsed_secs < 60 {
        format!("{}s", elapsed_secs)
    } else if elapsed_secs < 3600 {
        format!("{}m", elapsed_secs / 60)
    } else if elapsed_secs < 86400 {
        format!("{}h", elapsed_secs / 3600)
    } else {
        format!("{}d", elapsed_secs / 86400)
    }
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::InSync => "in-sync".to_string(),
        Outcome::Pushed => "pushed".to_string(),
        Outcome::Pulled => "pulled".to_string(),
        Outcome::Imported => "imported".to_string(),
        Outcome::Resolved => "resolved".to_string(),
        Outcome::ManualRequired => "conflict (manual resolution required)".to_string(),
        Outcome::Cancelled => "cancelled".to_string(),
        Outcome::DryRun(description) => format!("dry-run: {}", description),
        Outcome::Failed { message, .. } => format!("failed: {}", message),
    }
}

/// Print a report as per-mapping lines plus a one-line summary.
pub fn print_report(report: &SyncReport, format: OutputFormat, verbose: bool) {
    match format {
        OutputFormat::Json => {
            let lines: Vec<serde_json::Value> = report
                .results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "localId": r.local_id,
                        "remoteKey": r.remote_key,
                        "outcome": outcome_label(&r.outcome),
                    })
                })
                .collect();
            let obj = serde_json::json!({
                "results": lines,
                "synced": report.synced_count(),
                "conflicts": report.conflict_count(),
                "errors": report.error_count(),
            });
            match serde_json::to_string_pretty(&obj) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("failed to render JSON output: {}", e),
            }
        }
        OutputFormat::Text => {
            for result in &report.results {
                print_result_line(result, verbose);
            }
            println!(
                "{}",
                color::muted(&format!(
                    "{} mapping(s): {} synced, {} in conflict, {} failed",
                    report.results.len(),
                    report.synced_count(),
                    report.conflict_count(),
                    report.error_count(),
                ))
            );
        }
    }
}

fn print_result_line(result: &MappingOutcome, verbose: bool) {
    // Quiet runs skip the no-op lines
    if matches!(result.outcome, Outcome::InSync) && !verbose {
        return;
    }
    let ids = if result.local_id.is_empty() {
        result.remote_key.clone()
    } else {
        format!("{} <-> {}", result.local_id, result.remote_key)
    };
    println!("  {}  {}", ids, color::state(&outcome_label(&result.outcome)));
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
