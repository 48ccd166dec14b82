// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonicalization of local tasks and remote issues into comparable
//! payloads.
//!
//! The remote side encodes acceptance criteria (and optionally the
//! implementation plan / notes) as trailing sections of the issue
//! description. Those sections are always stripped before descriptions
//! are compared, so a checked-off criterion never masquerades as a
//! description edit.

use tracing::warn;

use crate::config::SyncConfig;
use crate::issue::RemoteIssue;
use crate::payload::{AcItem, NormalizedPayload};
use crate::task::{Priority, Task};

/// Fixed section markers in remote descriptions. Matching on recovery is
/// case-insensitive; rendering always uses these exact forms.
pub const AC_MARKER: &str = "Acceptance Criteria:";
pub const PLAN_MARKER: &str = "Implementation Plan:";
pub const NOTES_MARKER: &str = "Implementation Notes:";

/// A remote description split into its body and engine-owned sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionSections {
    pub body: String,
    pub acceptance_criteria: Vec<AcItem>,
    pub plan: Option<String>,
    pub notes: Option<String>,
}

/// Normalize a local task into its canonical payload.
///
/// Local descriptions are also run through section extraction: a task
/// created by import carries only the body, but a task edited by hand may
/// have had a section pasted in, and it must not count as a body change.
pub fn normalize_local(task: &Task) -> NormalizedPayload {
    let sections = extract_sections(&task.description);
    NormalizedPayload {
        title: task.title.trim().to_string(),
        description: sections.body,
        status: task.status.trim().to_string(),
        priority: task.priority,
        labels: normalize_labels(&task.labels),
        assignee: task.assignee.as_deref().map(normalize_assignee),
        acceptance_criteria: task
            .acceptance_criteria
            .iter()
            .map(|ac| AcItem {
                text: ac.text.trim().to_string(),
                checked: ac.checked,
            })
            .collect(),
    }
}

/// Normalize a remote issue into its canonical payload.
///
/// Status and priority are mapped into the local vocabulary through the
/// configured mappings (project overrides resolved from the issue key).
/// Unknown values are logged and defaulted: status falls back to the raw
/// remote name, priority to medium.
pub fn normalize_remote(issue: &RemoteIssue, config: &SyncConfig) -> NormalizedPayload {
    let project = project_of_key(&issue.key);
    let sections = extract_sections(&issue.description);

    let status = match config.canonical_status_for_remote(&issue.status, project) {
        Some(local) => local,
        None => {
            warn!(
                key = %issue.key,
                status = %issue.status,
                "remote status has no configured mapping, using raw value",
            );
            issue.status.trim().to_string()
        }
    };

    let priority = match &issue.priority {
        Some(name) => match config.canonical_priority_for_remote(name, project) {
            Some(p) => p,
            None => {
                warn!(
                    key = %issue.key,
                    priority = %name,
                    "remote priority has no configured mapping, defaulting to medium",
                );
                Priority::Medium
            }
        },
        None => Priority::Medium,
    };

    NormalizedPayload {
        title: issue.summary.trim().to_string(),
        description: sections.body,
        status,
        priority,
        labels: normalize_labels(&issue.labels),
        assignee: issue.assignee.as_deref().map(normalize_assignee),
        acceptance_criteria: sections.acceptance_criteria,
    }
}

/// The project key prefix of an issue key (`PROJ-123` → `PROJ`).
pub fn project_of_key(key: &str) -> Option<&str> {
    key.split_once('-').map(|(project, _)| project)
}

fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = labels
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn normalize_assignee(assignee: &str) -> String {
    assignee.trim().trim_start_matches('@').to_lowercase()
}

/// Sanitize a remote summary for use as a new local task title.
///
/// Only applied when importing creates a task: brackets become
/// parentheses, colons become ` -`, quotes and other characters that
/// break frontmatter parsing are stripped, and whitespace is collapsed.
pub fn sanitize_title(summary: &str) -> String {
    let mut out = String::with_capacity(summary.len());
    for ch in summary.chars() {
        match ch {
            '[' | '{' => out.push('('),
            ']' | '}' => out.push(')'),
            ':' => out.push_str(" -"),
            '"' | '\'' | '`' | '#' => {}
            c if c.is_whitespace() => out.push(' '),
            c => out.push(c),
        }
    }
    let mut collapsed = String::with_capacity(out.len());
    let mut last_space = true;
    for ch in out.chars() {
        if ch == ' ' {
            if !last_space {
                collapsed.push(' ');
            }
            last_space = true;
        } else {
            collapsed.push(ch);
            last_space = false;
        }
    }
    collapsed.trim().to_string()
}

/// Split a description into its body and engine-owned trailing sections.
///
/// Section markers are matched case-insensitively at line starts. Every
/// marker occurrence starts its section; content runs until the next
/// marker or end of input. The body is everything before the first
/// marker, trimmed.
pub fn extract_sections(description: &str) -> DescriptionSections {
    #[derive(PartialEq, Clone, Copy)]
    enum Section {
        Body,
        Ac,
        Plan,
        Notes,
    }

    let mut body = String::new();
    let mut ac_lines = String::new();
    let mut plan = String::new();
    let mut notes = String::new();
    let mut current = Section::Body;

    for line in description.lines() {
        let lower = line.trim().to_lowercase();
        if lower == AC_MARKER.to_lowercase() {
            current = Section::Ac;
            continue;
        }
        if lower == PLAN_MARKER.to_lowercase() {
            current = Section::Plan;
            continue;
        }
        if lower == NOTES_MARKER.to_lowercase() {
            current = Section::Notes;
            continue;
        }
        let target = match current {
            Section::Body => &mut body,
            Section::Ac => &mut ac_lines,
            Section::Plan => &mut plan,
            Section::Notes => &mut notes,
        };
        target.push_str(line);
        target.push('\n');
    }

    let acceptance_criteria = ac_lines
        .lines()
        .filter_map(parse_ac_line)
        .collect::<Vec<_>>();

    let trim = |s: String| {
        let t = s.trim().to_string();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    };

    DescriptionSections {
        body: body.trim().to_string(),
        acceptance_criteria,
        plan: trim(plan),
        notes: trim(notes),
    }
}

/// Parse one `- [ ] text` / `- [x] text` checklist line. The checkbox
/// marker is matched case-insensitively; non-checklist lines are skipped.
fn parse_ac_line(line: &str) -> Option<AcItem> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("- [")?;
    let (mark, text) = rest.split_once(']')?;
    let checked = match mark.trim() {
        "" => false,
        m if m.eq_ignore_ascii_case("x") => true,
        _ => return None,
    };
    Some(AcItem {
        text: text.trim().to_string(),
        checked,
    })
}

/// Render a remote description from a body and the engine-owned sections.
///
/// Sections are always rewritten as single trailing blocks in a fixed
/// order, regardless of where they appeared in the input.
pub fn render_remote_description(
    body: &str,
    acceptance_criteria: &[AcItem],
    plan: Option<&str>,
    notes: Option<&str>,
) -> String {
    let mut out = body.trim().to_string();

    if !acceptance_criteria.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(AC_MARKER);
        for item in acceptance_criteria {
            out.push('\n');
            out.push_str(if item.checked { "- [x] " } else { "- [ ] " });
            out.push_str(&item.text);
        }
    }

    if let Some(plan) = plan.filter(|p| !p.trim().is_empty()) {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(PLAN_MARKER);
        out.push('\n');
        out.push_str(plan.trim());
    }

    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(NOTES_MARKER);
        out.push('\n');
        out.push_str(notes.trim());
    }

    out
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
