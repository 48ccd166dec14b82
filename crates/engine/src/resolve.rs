// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict resolution: three-way merge of normalized payloads under a
//! strategy, and the seam to the interactive resolver.

use async_trait::async_trait;

use tether_core::{
    ConflictField, ConflictStrategy, FieldChoice, FieldConflict, NormalizedPayload, Priority,
    Resolution,
};

use crate::error::EngineError;

/// Outcome of an interactive resolution session.
#[derive(Debug, Clone)]
pub enum PromptOutcome {
    /// The user decided every field and confirmed the preview.
    Resolved {
        resolution: Resolution,
        /// Set when the user accepted persisting a one-sided preference
        /// as the default strategy.
        persist_strategy: Option<ConflictStrategy>,
    },
    /// The user declined the preview or interrupted; nothing may be
    /// mutated.
    Cancelled,
}

/// Seam to the terminal UI. The engine never talks to a terminal
/// itself; watch mode runs without any prompter at all.
#[async_trait]
pub trait ConflictPrompter: Send + Sync {
    async fn resolve_conflicts(
        &self,
        local_id: &str,
        remote_key: &str,
        conflicts: &[FieldConflict],
    ) -> Result<PromptOutcome, EngineError>;
}

/// Three-way merge with a side preference: one-sided changes win
/// outright; fields where both sides moved take the preferred side.
pub fn merge_prefer(
    base: &NormalizedPayload,
    local: &NormalizedPayload,
    remote: &NormalizedPayload,
    prefer_local: bool,
) -> NormalizedPayload {
    let mut merged = base.clone();
    for field in ConflictField::ALL {
        let local_changed = field_differs(local, base, field);
        let remote_changed = field_differs(remote, base, field);
        let source = match (local_changed, remote_changed) {
            (false, false) => base,
            (true, false) => local,
            (false, true) => remote,
            (true, true) => {
                if prefer_local {
                    local
                } else {
                    remote
                }
            }
        };
        copy_field(&mut merged, source, field);
    }
    // Acceptance criteria ride along with the side that changed them;
    // they are not a prompted field.
    if local.acceptance_criteria != base.acceptance_criteria {
        merged.acceptance_criteria = local.acceptance_criteria.clone();
    } else {
        merged.acceptance_criteria = remote.acceptance_criteria.clone();
    }
    merged
}

/// Build the desired payload from the user's per-field choices. Fields
/// that were not in conflict merge as one-sided changes.
pub fn apply_resolution(
    base: &NormalizedPayload,
    local: &NormalizedPayload,
    remote: &NormalizedPayload,
    resolution: &Resolution,
) -> Result<NormalizedPayload, EngineError> {
    // Start from the non-conflicting merge; choices then override the
    // conflicting fields.
    let mut merged = merge_prefer(base, local, remote, true);
    for (field, choice) in &resolution.choices {
        match choice {
            FieldChoice::Local => copy_field(&mut merged, local, *field),
            FieldChoice::Remote => copy_field(&mut merged, remote, *field),
            FieldChoice::Manual(value) => set_field(&mut merged, *field, value)?,
        }
    }
    Ok(merged)
}

fn field_differs(a: &NormalizedPayload, b: &NormalizedPayload, field: ConflictField) -> bool {
    match field {
        ConflictField::Title => a.title != b.title,
        ConflictField::Description => a.description != b.description,
        ConflictField::Status => a.status != b.status,
        ConflictField::Assignee => a.assignee != b.assignee,
        ConflictField::Priority => a.priority != b.priority,
        ConflictField::Labels => a.labels != b.labels,
    }
}

fn copy_field(dst: &mut NormalizedPayload, src: &NormalizedPayload, field: ConflictField) {
    match field {
        ConflictField::Title => dst.title = src.title.clone(),
        ConflictField::Description => dst.description = src.description.clone(),
        ConflictField::Status => dst.status = src.status.clone(),
        ConflictField::Assignee => dst.assignee = src.assignee.clone(),
        ConflictField::Priority => dst.priority = src.priority,
        ConflictField::Labels => dst.labels = src.labels.clone(),
    }
}

/// Parse a manually-entered value into a payload field.
fn set_field(
    payload: &mut NormalizedPayload,
    field: ConflictField,
    value: &str,
) -> Result<(), EngineError> {
    match field {
        ConflictField::Title => payload.title = value.trim().to_string(),
        ConflictField::Description => payload.description = value.to_string(),
        ConflictField::Status => payload.status = value.trim().to_string(),
        ConflictField::Assignee => {
            let trimmed = value.trim();
            payload.assignee = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_lowercase())
            };
        }
        ConflictField::Priority => {
            payload.priority =
                value
                    .trim()
                    .parse::<Priority>()
                    .map_err(|message| EngineError::InvalidFieldValue {
                        field: "priority".to_string(),
                        value: value.to_string(),
                        message,
                    })?;
        }
        ConflictField::Labels => {
            let mut labels: Vec<String> = value
                .split(',')
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect();
            labels.sort();
            labels.dedup();
            payload.labels = labels;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
