// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsers for the `task` CLI's `--plain` output.
//!
//! List output is blank-line-separated blocks of `Key: value` lines.
//! Detail output leads with `Key: value` metadata and then free-text
//! sections; a section boundary is any line of one or two capitalized
//! words ending in a bare colon (`Description:`, `Acceptance Criteria:`).

use tether_core::{AcceptanceCriterion, Priority, Task};

use super::LocalError;

/// Parse `task list --plain`: blank-line-separated summary blocks.
pub fn parse_task_list(output: &str) -> Result<Vec<Task>, LocalError> {
    let mut tasks = Vec::new();
    for block in output.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        tasks.push(parse_list_block(block)?);
    }
    Ok(tasks)
}

fn parse_list_block(block: &str) -> Result<Task, LocalError> {
    let mut task = Task::default();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "ID" => task.id = value.to_string(),
            "Title" => task.title = value.to_string(),
            "Status" => task.status = value.to_string(),
            "Assignee" => {
                if !value.is_empty() && value != "-" {
                    task.assignee = Some(value.to_string());
                }
            }
            "Labels" => task.labels = split_csv(value),
            "Priority" => task.priority = parse_priority(value)?,
            "File" => task.file_path = Some(value.to_string()),
            _ => {}
        }
    }
    if task.id.is_empty() {
        return Err(LocalError::Parse {
            section: "list".to_string(),
            message: format!("record without an ID line: {:?}", first_line(block)),
        });
    }
    Ok(task)
}

/// Parse `task <id> --plain`: metadata lines, then sections.
pub fn parse_task_detail(id: &str, output: &str) -> Result<Task, LocalError> {
    let mut task = Task {
        id: id.to_string(),
        ..Task::default()
    };

    #[derive(Clone, Copy, PartialEq)]
    enum Section {
        Meta,
        Description,
        AcceptanceCriteria,
        Plan,
        Notes,
        Other,
    }

    let mut section = Section::Meta;
    let mut description = String::new();
    let mut plan = String::new();
    let mut notes = String::new();

    for line in output.lines() {
        if let Some(header) = section_header(line) {
            section = match header.as_str() {
                "Description" => Section::Description,
                "Acceptance Criteria" => Section::AcceptanceCriteria,
                "Implementation Plan" => Section::Plan,
                "Implementation Notes" => Section::Notes,
                _ => Section::Other,
            };
            continue;
        }

        match section {
            Section::Meta => {
                let Some((key, value)) = line.split_once(':') else {
                    continue;
                };
                let value = value.trim();
                match key.trim() {
                    "Title" => task.title = value.to_string(),
                    "Status" => task.status = value.to_string(),
                    "Assignee" => {
                        if !value.is_empty() && value != "-" {
                            task.assignee = Some(value.to_string());
                        }
                    }
                    "Labels" => task.labels = split_csv(value),
                    "Priority" => task.priority = parse_priority(value)?,
                    "File" => task.file_path = Some(value.to_string()),
                    _ => {}
                }
            }
            Section::Description => {
                description.push_str(line);
                description.push('\n');
            }
            Section::AcceptanceCriteria => {
                if let Some(ac) = parse_ac_line(line) {
                    task.acceptance_criteria.push(ac);
                } else if !line.trim().is_empty() {
                    return Err(LocalError::Parse {
                        section: "Acceptance Criteria".to_string(),
                        message: format!("not a checklist line: {:?}", line),
                    });
                }
            }
            Section::Plan => {
                plan.push_str(line);
                plan.push('\n');
            }
            Section::Notes => {
                notes.push_str(line);
                notes.push('\n');
            }
            Section::Other => {}
        }
    }

    task.description = description.trim().to_string();
    task.implementation_plan = plan.trim().to_string();
    task.implementation_notes = notes.trim().to_string();

    if task.title.is_empty() {
        return Err(LocalError::Parse {
            section: "detail".to_string(),
            message: format!("no Title line for task {}", id),
        });
    }
    Ok(task)
}

/// Parse the id echoed by `task create` (a line like `Created task task-42`).
pub fn parse_created_id(output: &str) -> Result<String, LocalError> {
    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("Created task ") {
            let id = rest.trim();
            if !id.is_empty() {
                return Ok(id.to_string());
            }
        }
    }
    // Some versions echo the bare id on the first line
    let first = output.trim().lines().next().unwrap_or("").trim();
    if !first.is_empty() && !first.contains(' ') {
        return Ok(first.to_string());
    }
    Err(LocalError::Parse {
        section: "create".to_string(),
        message: format!("no created id in output: {:?}", first_line(output)),
    })
}

/// A section boundary is one or two capitalized words followed by a bare
/// colon. `Status: Done` has content after the colon and is metadata, not
/// a boundary.
fn section_header(line: &str) -> Option<String> {
    let trimmed = line.trim_end();
    let name = trimmed.strip_suffix(':')?;
    let words: Vec<&str> = name.split(' ').collect();
    if words.is_empty() || words.len() > 2 {
        return None;
    }
    let capitalized = |w: &&str| {
        let mut chars = w.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphabetic())
    };
    if words.iter().all(capitalized) {
        Some(name.to_string())
    } else {
        None
    }
}

fn parse_ac_line(line: &str) -> Option<AcceptanceCriterion> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("- [")?;
    let (mark, text) = rest.split_once(']')?;
    let checked = match mark.trim() {
        "" => false,
        m if m.eq_ignore_ascii_case("x") => true,
        _ => return None,
    };
    Some(AcceptanceCriterion::new(text.trim(), checked))
}

fn parse_priority(value: &str) -> Result<Priority, LocalError> {
    value.parse().map_err(|message| LocalError::Parse {
        section: "Priority".to_string(),
        message,
    })
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
