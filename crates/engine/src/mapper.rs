// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping discovery: fuzzy title matching, interactive candidate
//! selection, and direct linking. Binding always establishes initial
//! snapshots from the *current* state of both sides so the first
//! subsequent sync classifies as InSync.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use tether_adapters::{LocalAdapter, RemoteAdapter};
use tether_core::{
    name_similarity, normalize_local, normalize_remote, title_score, RemoteIssue, SyncConfig,
    SyncState, Task, TaskFilter,
};
use tether_storage::{Mapping, Operation};

use crate::context::SyncContext;
use crate::error::EngineError;

/// Default auto-match acceptance threshold.
pub const DEFAULT_MIN_SCORE: f64 = 0.7;
/// Assignee auto-discovery acceptance threshold.
const ASSIGNEE_MIN_SCORE: f64 = 0.6;
/// How many candidates to pull per search.
const CANDIDATE_LIMIT: usize = 50;

/// A scored remote candidate for one local task.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub issue: RemoteIssue,
    pub score: f64,
}

/// Result line for one local task during mapping.
#[derive(Debug, Clone)]
pub enum MapOutcome {
    Mapped { local_id: String, remote_key: String, score: f64 },
    NoMatch { local_id: String, best_score: f64 },
    Skipped { local_id: String },
    Aborted,
}

/// The interactive candidate-selection seam, implemented by the CLI.
#[async_trait]
pub trait CandidatePicker: Send + Sync {
    async fn pick(
        &self,
        task: &Task,
        candidates: &[ScoredCandidate],
    ) -> Result<PickOutcome, EngineError>;
}

/// What the operator chose for one task.
#[derive(Debug, Clone)]
pub enum PickOutcome {
    Selected(String),
    /// Re-run the candidate search with operator-supplied JQL.
    CustomJql(String),
    Skip,
    Abort,
}

/// Establishes new mappings.
pub struct Mapper<L: LocalAdapter, R: RemoteAdapter> {
    local: L,
    remote: R,
    ctx: Arc<SyncContext>,
}

impl<L: LocalAdapter, R: RemoteAdapter> Mapper<L, R> {
    pub fn new(local: L, remote: R, ctx: Arc<SyncContext>) -> Self {
        Self { local, remote, ctx }
    }

    /// Local tasks that do not participate in any mapping yet.
    async fn unmapped_tasks(&self) -> Result<Vec<Task>, EngineError> {
        let tasks = self.local.list_tasks(&TaskFilter::default()).await?;
        let mut unmapped = Vec::new();
        for task in tasks {
            if self.ctx.store().get_mapping(&task.id)?.is_none() {
                unmapped.push(task);
            }
        }
        Ok(unmapped)
    }

    fn candidate_jql(&self, config: &SyncConfig) -> Option<String> {
        config.jql_filter.clone().or_else(|| {
            config
                .project_key
                .as_ref()
                .map(|key| format!("project = {}", key))
        })
    }

    async fn candidates_for(
        &self,
        task: &Task,
        jql: &str,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let page = self.remote.search_issues(jql, CANDIDATE_LIMIT, 0).await?;
        let mut scored: Vec<ScoredCandidate> = page
            .issues
            .into_iter()
            .filter(|issue| {
                self.ctx
                    .store()
                    .get_mapping_by_remote_key(&issue.key)
                    .map(|m| m.is_none())
                    .unwrap_or(false)
            })
            .map(|issue| ScoredCandidate {
                score: title_score(&task.title, &issue.summary),
                issue,
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored)
    }

    /// Auto-map every unmapped local task whose best candidate scores at
    /// least `min_score`.
    pub async fn map_auto(&self, min_score: Option<f64>) -> Result<Vec<MapOutcome>, EngineError> {
        let min_score = min_score.unwrap_or(DEFAULT_MIN_SCORE);
        let config = self.ctx.config();
        let Some(jql) = self.candidate_jql(&config) else {
            warn!("no jqlFilter or projectKey configured; nothing to match against");
            return Ok(Vec::new());
        };

        let mut outcomes = Vec::new();
        for task in self.unmapped_tasks().await? {
            let candidates = self.candidates_for(&task, &jql).await?;
            match candidates.first() {
                Some(best) if best.score >= min_score => {
                    let issue = best.issue.clone();
                    let remote_key = issue.key.clone();
                    let score = best.score;
                    self.bind(&task, &issue, false).await?;
                    info!(local_id = %task.id, key = %remote_key, score, "auto-mapped");
                    outcomes.push(MapOutcome::Mapped {
                        local_id: task.id,
                        remote_key,
                        score,
                    });
                }
                best => {
                    outcomes.push(MapOutcome::NoMatch {
                        local_id: task.id,
                        best_score: best.map(|c| c.score).unwrap_or(0.0),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    /// Interactive mapping: ranked candidates per task, operator picks.
    pub async fn map_interactive(
        &self,
        picker: &dyn CandidatePicker,
    ) -> Result<Vec<MapOutcome>, EngineError> {
        let config = self.ctx.config();
        let Some(default_jql) = self.candidate_jql(&config) else {
            warn!("no jqlFilter or projectKey configured; nothing to match against");
            return Ok(Vec::new());
        };

        let mut outcomes = Vec::new();
        'tasks: for task in self.unmapped_tasks().await? {
            let mut jql = default_jql.clone();
            loop {
                let candidates = self.candidates_for(&task, &jql).await?;
                match picker.pick(&task, &candidates).await? {
                    PickOutcome::Selected(remote_key) => {
                        let issue = self.remote.get_issue(&remote_key).await?;
                        self.bind(&task, &issue, false).await?;
                        outcomes.push(MapOutcome::Mapped {
                            local_id: task.id.clone(),
                            remote_key,
                            score: 1.0,
                        });
                        continue 'tasks;
                    }
                    PickOutcome::CustomJql(custom) => {
                        jql = custom;
                    }
                    PickOutcome::Skip => {
                        outcomes.push(MapOutcome::Skipped {
                            local_id: task.id.clone(),
                        });
                        continue 'tasks;
                    }
                    PickOutcome::Abort => {
                        outcomes.push(MapOutcome::Aborted);
                        break 'tasks;
                    }
                }
            }
        }
        Ok(outcomes)
    }

    /// Directly bind a task to an issue, validating that both exist and
    /// that neither already participates in a mapping (unless forced).
    pub async fn map_link(
        &self,
        local_id: &str,
        remote_key: &str,
        force: bool,
    ) -> Result<(), EngineError> {
        let task = self.local.get_task(local_id).await?;
        let issue = self.remote.get_issue(remote_key).await?;

        if !force {
            if let Some(existing) = self.ctx.store().get_mapping(local_id)? {
                return Err(EngineError::AlreadyMapped {
                    local_id: local_id.to_string(),
                    remote_key: existing.remote_key,
                });
            }
            if let Some(existing) = self.ctx.store().get_mapping_by_remote_key(remote_key)? {
                return Err(EngineError::RemoteAlreadyMapped {
                    remote_key: remote_key.to_string(),
                    local_id: existing.local_id,
                });
            }
        }

        self.bind(&task, &issue, force).await
    }

    /// Write the mapping, initial snapshots from the current state of
    /// both sides, frontmatter, and the op-log entry.
    async fn bind(&self, task: &Task, issue: &RemoteIssue, replacing: bool) -> Result<(), EngineError> {
        if self.ctx.dry_run() {
            return Ok(());
        }
        let config = self.ctx.config();

        if replacing {
            // A forced re-link replaces whatever was bound to either side.
            if let Some(existing) = self.ctx.store().get_mapping_by_remote_key(&issue.key)? {
                self.ctx.store().delete_mapping(&existing.local_id)?;
            }
            self.ctx.store().delete_mapping(&task.id)?;
        }

        let mapping = Mapping::new(&task.id, &issue.key);
        self.ctx.store().put_mapping(&mapping)?;
        self.ctx.write_snapshots(
            &task.id,
            &normalize_local(task),
            &normalize_remote(issue, &config),
        )?;
        self.ctx
            .update_frontmatter(task, &mapping, SyncState::InSync)?;
        self.ctx
            .log_ok(Operation::Map, &task.id, Some(&issue.key), None);
        Ok(())
    }
}

/// Fuzzy assignee discovery: for each remote assignee, find the closest
/// local identifier by normalized Levenshtein similarity. Pairs scoring
/// at least 0.6 are proposed unless the local identifier already has an
/// explicit mapping (explicit always shadows auto).
pub fn discover_assignee_mappings(
    tasks: &[Task],
    remote_assignees: &[String],
    config: &SyncConfig,
) -> Vec<(String, String)> {
    let mut local_assignees: Vec<String> = Vec::new();
    for task in tasks {
        if let Some(assignee) = &task.assignee {
            let trimmed = assignee.trim().trim_start_matches('@').to_string();
            if !trimmed.is_empty() && !local_assignees.contains(&trimmed) {
                local_assignees.push(trimmed);
            }
        }
    }

    let mut discovered = Vec::new();
    for remote in remote_assignees {
        let best = local_assignees
            .iter()
            .map(|local| (local, name_similarity(local, remote)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let Some((local, score)) = best else {
            continue;
        };
        if score < ASSIGNEE_MIN_SCORE {
            continue;
        }
        if config.assignee_mapping.contains_key(local) {
            continue;
        }
        if config.auto_mapped_assignees.contains_key(local) {
            continue;
        }
        info!(local = %local, remote = %remote, score, "auto-discovered assignee mapping");
        discovered.push((local.clone(), remote.clone()));
    }
    discovered
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
