// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive prompts: the field-by-field conflict resolver and the
//! mapping candidate picker.
//!
//! Nothing here mutates anything — choices are collected, previewed,
//! and handed back to the engine, which applies them only after the
//! final confirmation.

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use tether_core::{ConflictStrategy, FieldChoice, FieldConflict, Resolution, Task};
use tether_engine::{
    CandidatePicker, ConflictPrompter, EngineError, PickOutcome, PromptOutcome, ScoredCandidate,
};

use crate::color;

/// Display width cap for field values.
const VALUE_WIDTH: usize = 70;
/// How many candidates the picker shows per task.
const PICKER_LIMIT: usize = 10;
/// Offer to persist a side as the default strategy when its picks
/// outnumber the other side's at least 2:1.
const PERSIST_RATIO: usize = 2;

/// Truncate a value for display: first line only, at most `max` chars,
/// with an ellipsis when anything was cut.
pub fn truncate_value(value: &str, max: usize) -> String {
    let first_line = value.lines().next().unwrap_or("");
    let multiline = value.lines().count() > 1;
    let mut out: String = first_line.chars().take(max).collect();
    if multiline || first_line.chars().count() > max {
        out.push('…');
    }
    if out.is_empty() {
        "(empty)".to_string()
    } else {
        out
    }
}

/// Decide whether the user's choices justify offering persistence.
pub fn persistence_candidate(resolution: &Resolution) -> Option<ConflictStrategy> {
    let (local, remote) = resolution.side_counts();
    if local > 0 && local >= remote * PERSIST_RATIO {
        Some(ConflictStrategy::PreferLocal)
    } else if remote > 0 && remote >= local * PERSIST_RATIO {
        Some(ConflictStrategy::PreferRemote)
    } else {
        None
    }
}

/// The dialoguer-backed conflict resolver.
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ask_field(&self, conflict: &FieldConflict) -> Result<Option<FieldChoice>, EngineError> {
        println!();
        println!("{}", color::header(&format!("Conflict: {}", conflict.field)));
        println!(
            "  base:   {}",
            color::muted(&truncate_value(&conflict.base_value, VALUE_WIDTH))
        );
        println!(
            "  local:  {}",
            color::green(&truncate_value(&conflict.local_value, VALUE_WIDTH))
        );
        println!(
            "  remote: {}",
            color::yellow(&truncate_value(&conflict.remote_value, VALUE_WIDTH))
        );

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Which {} should win?", conflict.field))
            .items(&["use local", "use remote", "enter manually"])
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?;

        match selection {
            None => Ok(None),
            Some(0) => Ok(Some(FieldChoice::Local)),
            Some(1) => Ok(Some(FieldChoice::Remote)),
            _ => {
                let value: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("New {} value", conflict.field))
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_error)?;
                Ok(Some(FieldChoice::Manual(value)))
            }
        }
    }

    fn preview_and_confirm(
        &self,
        conflicts: &[FieldConflict],
        resolution: &Resolution,
    ) -> Result<bool, EngineError> {
        println!();
        println!("{}", color::header("Resolution preview"));
        for conflict in conflicts {
            let chosen = match resolution.choice_for(conflict.field) {
                Some(FieldChoice::Local) => conflict.local_value.clone(),
                Some(FieldChoice::Remote) => conflict.remote_value.clone(),
                Some(FieldChoice::Manual(value)) => value.clone(),
                None => conflict.base_value.clone(),
            };
            println!(
                "  {}: {}",
                conflict.field,
                truncate_value(&chosen, VALUE_WIDTH)
            );
        }

        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Apply these choices?")
            .default(true)
            .interact_opt()
            .map_err(prompt_error)
            .map(|answer| answer.unwrap_or(false))
    }

    fn offer_persistence(
        &self,
        resolution: &Resolution,
    ) -> Result<Option<ConflictStrategy>, EngineError> {
        let Some(strategy) = persistence_candidate(resolution) else {
            return Ok(None);
        };
        let accepted = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "You mostly chose one side. Save '{}' as the default strategy?",
                strategy
            ))
            .default(false)
            .interact_opt()
            .map_err(prompt_error)?
            .unwrap_or(false);
        Ok(accepted.then_some(strategy))
    }
}

#[async_trait]
impl ConflictPrompter for TerminalPrompter {
    async fn resolve_conflicts(
        &self,
        local_id: &str,
        remote_key: &str,
        conflicts: &[FieldConflict],
    ) -> Result<PromptOutcome, EngineError> {
        println!(
            "{}",
            color::header(&format!(
                "Resolving conflict between {} and {}",
                local_id, remote_key
            ))
        );

        let mut resolution = Resolution::default();
        for conflict in conflicts {
            match self.ask_field(conflict)? {
                Some(choice) => resolution.choices.push((conflict.field, choice)),
                // Interrupt mid-way: nothing is applied
                None => return Ok(PromptOutcome::Cancelled),
            }
        }

        if !self.preview_and_confirm(conflicts, &resolution)? {
            return Ok(PromptOutcome::Cancelled);
        }
        let persist_strategy = self.offer_persistence(&resolution)?;

        Ok(PromptOutcome::Resolved {
            resolution,
            persist_strategy,
        })
    }
}

/// The dialoguer-backed candidate picker for `map interactive`.
pub struct TerminalPicker;

#[async_trait]
impl CandidatePicker for TerminalPicker {
    async fn pick(
        &self,
        task: &Task,
        candidates: &[ScoredCandidate],
    ) -> Result<PickOutcome, EngineError> {
        println!();
        println!(
            "{}",
            color::header(&format!("Map '{}' ({})", task.title, task.id))
        );

        let mut items: Vec<String> = candidates
            .iter()
            .take(PICKER_LIMIT)
            .map(|c| {
                format!(
                    "{}  {}  {}",
                    c.issue.key,
                    truncate_value(&c.issue.summary, 50),
                    color::muted(&format!("({:.2})", c.score)),
                )
            })
            .collect();
        let shown = items.len();
        items.push("search with custom JQL".to_string());
        items.push("skip this task".to_string());
        items.push("abort".to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Pick the matching issue")
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?;

        match selection {
            None => Ok(PickOutcome::Abort),
            Some(index) if index < shown => {
                Ok(PickOutcome::Selected(candidates[index].issue.key.clone()))
            }
            Some(index) if index == shown => {
                let jql: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("JQL")
                    .interact_text()
                    .map_err(prompt_error)?;
                Ok(PickOutcome::CustomJql(jql))
            }
            Some(index) if index == shown + 1 => Ok(PickOutcome::Skip),
            Some(_) => Ok(PickOutcome::Abort),
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> EngineError {
    EngineError::Prompt(e.to_string())
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
