// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field-level conflict model shared by the engine and the interactive
//! resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payload::NormalizedPayload;

/// The fields that participate in conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictField {
    Title,
    Description,
    Status,
    Assignee,
    Priority,
    Labels,
}

impl ConflictField {
    pub const ALL: [ConflictField; 6] = [
        ConflictField::Title,
        ConflictField::Description,
        ConflictField::Status,
        ConflictField::Assignee,
        ConflictField::Priority,
        ConflictField::Labels,
    ];
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Title => write!(f, "title"),
            ConflictField::Description => write!(f, "description"),
            ConflictField::Status => write!(f, "status"),
            ConflictField::Assignee => write!(f, "assignee"),
            ConflictField::Priority => write!(f, "priority"),
            ConflictField::Labels => write!(f, "labels"),
        }
    }
}

/// One conflicting field with the three values of the three-way merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConflict {
    pub field: ConflictField,
    pub base_value: String,
    pub local_value: String,
    pub remote_value: String,
}

/// The user's (or strategy's) decision for one conflicting field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChoice {
    Local,
    Remote,
    Manual(String),
}

/// A complete resolution: one choice per conflicting field.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub choices: Vec<(ConflictField, FieldChoice)>,
}

impl Resolution {
    pub fn choice_for(&self, field: ConflictField) -> Option<&FieldChoice> {
        self.choices
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c)
    }

    /// Counts of (local, remote) picks, ignoring manual entries. Used to
    /// decide whether to offer persisting a one-sided preference.
    pub fn side_counts(&self) -> (usize, usize) {
        let mut local = 0;
        let mut remote = 0;
        for (_, choice) in &self.choices {
            match choice {
                FieldChoice::Local => local += 1,
                FieldChoice::Remote => remote += 1,
                FieldChoice::Manual(_) => {}
            }
        }
        (local, remote)
    }
}

/// Render one payload field as the string shown to the user and carried in
/// [`FieldConflict`] values.
pub fn field_value(payload: &NormalizedPayload, field: ConflictField) -> String {
    match field {
        ConflictField::Title => payload.title.clone(),
        ConflictField::Description => payload.description.clone(),
        ConflictField::Status => payload.status.clone(),
        ConflictField::Assignee => payload.assignee.clone().unwrap_or_default(),
        ConflictField::Priority => payload.priority.to_string(),
        ConflictField::Labels => payload.labels.join(", "),
    }
}

/// Decompose a three-way diff into per-field conflicts: a field conflicts
/// when local and remote disagree and both differ from base.
pub fn detect_field_conflicts(
    base: &NormalizedPayload,
    local: &NormalizedPayload,
    remote: &NormalizedPayload,
) -> Vec<FieldConflict> {
    let mut conflicts = Vec::new();
    for field in ConflictField::ALL {
        let base_value = field_value(base, field);
        let local_value = field_value(local, field);
        let remote_value = field_value(remote, field);
        if local_value != remote_value && local_value != base_value && remote_value != base_value {
            conflicts.push(FieldConflict {
                field,
                base_value,
                local_value,
                remote_value,
            });
        }
    }
    conflicts
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
