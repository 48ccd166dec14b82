// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciliation engine: push, pull, bidirectional sync, and
//! import, over one mapping at a time.
//!
//! Per-mapping ordering is strict: apply the remote/local change, then
//! write both snapshots, then update frontmatter, then append the op-log
//! entry. A crash between steps is recoverable because classification
//! reruns from whatever state survived.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;

use tether_adapters::{IssueFields, LocalAdapter, RemoteAdapter};
use tether_core::{
    classify_sync_state, detect_field_conflicts, extract_sections, normalize_local,
    normalize_remote, payload_hash, render_remote_description, sanitize_title, AcItem,
    AcceptanceCriterion, ConflictStrategy, NewTask, NormalizedPayload, RemoteIssue, SyncConfig,
    SyncState, Task, TaskFilter, TaskUpdate,
};
use tether_storage::{Mapping, Operation, Side};

use crate::context::SyncContext;
use crate::error::EngineError;
use crate::resolve::{self, ConflictPrompter, PromptOutcome};
use crate::transition::{describe_transitions, find_transition};

/// Page size for remote searches during import.
const SEARCH_PAGE_SIZE: usize = 50;

/// What happened to one mapping.
#[derive(Debug, Clone)]
pub enum Outcome {
    InSync,
    Pushed,
    Pulled,
    Imported,
    Resolved,
    /// Conflict left for manual follow-up (manual strategy).
    ManualRequired,
    /// The user declined the interactive resolution.
    Cancelled,
    /// Dry-run: describes what would have happened.
    DryRun(String),
    Failed {
        message: String,
        rate_limited: bool,
    },
}

/// Per-mapping result line.
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub local_id: String,
    pub remote_key: String,
    pub outcome: Outcome,
}

/// Aggregated result of one engine run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub results: Vec<MappingOutcome>,
}

impl SyncReport {
    pub fn synced_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    Outcome::Pushed | Outcome::Pulled | Outcome::Resolved | Outcome::Imported
                )
            })
            .count()
    }

    pub fn conflict_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::ManualRequired | Outcome::Cancelled))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
            .count()
    }

    pub fn rate_limited(&self) -> bool {
        self.results.iter().any(|r| {
            matches!(
                r.outcome,
                Outcome::Failed {
                    rate_limited: true,
                    ..
                }
            )
        })
    }
}

/// Operation selector for the shared per-mapping path.
#[derive(Clone, Copy)]
enum OpKind {
    Push { force: bool },
    Pull { force: bool },
    Sync { strategy: ConflictStrategy },
}

impl OpKind {
    fn log_operation(&self) -> Operation {
        match self {
            OpKind::Push { .. } => Operation::Push,
            OpKind::Pull { .. } => Operation::Pull,
            OpKind::Sync { .. } => Operation::Sync,
        }
    }
}

/// Which sides an operation is allowed to write. Push writes the
/// remote, pull writes the local task, conflict resolution writes both.
#[derive(Clone, Copy)]
struct ApplySides {
    remote: bool,
    local: bool,
}

impl ApplySides {
    const PUSH: ApplySides = ApplySides {
        remote: true,
        local: false,
    };
    const PULL: ApplySides = ApplySides {
        remote: false,
        local: true,
    };
    const BOTH: ApplySides = ApplySides {
        remote: true,
        local: true,
    };
}

/// Both sides of a mapping, loaded and classified.
struct PairState {
    task: Task,
    issue: RemoteIssue,
    local_payload: NormalizedPayload,
    remote_payload: NormalizedPayload,
    base: Option<NormalizedPayload>,
    state: SyncState,
}

/// The engine. Cheap to clone; clones share the context.
pub struct Reconciler<L: LocalAdapter, R: RemoteAdapter> {
    local: L,
    remote: R,
    ctx: Arc<SyncContext>,
}

impl<L: LocalAdapter, R: RemoteAdapter> Clone for Reconciler<L, R> {
    fn clone(&self) -> Self {
        Self {
            local: self.local.clone(),
            remote: self.remote.clone(),
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl<L: LocalAdapter, R: RemoteAdapter> Reconciler<L, R> {
    pub fn new(local: L, remote: R, ctx: Arc<SyncContext>) -> Self {
        Self { local, remote, ctx }
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Push local changes to the remote for the selected mappings.
    pub async fn push(
        &self,
        selection: Option<&[String]>,
        force: bool,
    ) -> Result<SyncReport, EngineError> {
        let mappings = self.select_mappings(selection)?;
        Ok(self.run_batched(mappings, OpKind::Push { force }).await)
    }

    /// Pull remote changes into local tasks. A full pull (no explicit
    /// selection) first imports unmapped issues matching the configured
    /// JQL filter.
    pub async fn pull(
        &self,
        selection: Option<&[String]>,
        force: bool,
    ) -> Result<SyncReport, EngineError> {
        let mut report = SyncReport::default();
        if selection.is_none() {
            report = self.import().await?;
        }
        let mappings = self.select_mappings(selection)?;
        let pulled = self.run_batched(mappings, OpKind::Pull { force }).await;
        report.results.extend(pulled.results);
        Ok(report)
    }

    /// Bidirectional sync. Conflicts dispatch to the strategy; the
    /// prompt strategy needs a prompter and runs mappings sequentially.
    pub async fn sync(
        &self,
        selection: Option<&[String]>,
        strategy_override: Option<ConflictStrategy>,
        prompter: Option<Arc<dyn ConflictPrompter>>,
    ) -> Result<SyncReport, EngineError> {
        let strategy =
            strategy_override.unwrap_or_else(|| self.ctx.config().conflict_strategy);
        let mappings = self.select_mappings(selection)?;

        if strategy == ConflictStrategy::Prompt {
            let prompter = prompter.ok_or(EngineError::PromptInWatch)?;
            let mut report = SyncReport::default();
            for mapping in mappings {
                let op = OpKind::Sync { strategy };
                let outcome = self
                    .apply_op(&mapping, op, Some(prompter.as_ref()))
                    .await;
                report.results.push(self.finish(op, mapping, outcome));
            }
            return Ok(report);
        }

        Ok(self
            .run_batched(mappings, OpKind::Sync { strategy })
            .await)
    }

    /// Import: query the remote with the configured JQL, create local
    /// tasks for unmapped issues, and bind them with initial snapshots.
    pub async fn import(&self) -> Result<SyncReport, EngineError> {
        let config = self.ctx.config();
        let Some(jql) = import_jql(&config) else {
            warn!("no jqlFilter or projectKey configured, skipping import");
            return Ok(SyncReport::default());
        };

        let mut report = SyncReport::default();
        let mut imported_issues = Vec::new();
        let mut start_at = 0;
        loop {
            let page = self
                .remote
                .search_issues(&jql, SEARCH_PAGE_SIZE, start_at)
                .await?;
            let fetched = page.issues.len();
            if fetched == 0 {
                break;
            }

            for issue in page.issues {
                // Partition: already-mapped issues are left to pull.
                if self
                    .ctx
                    .store()
                    .get_mapping_by_remote_key(&issue.key)?
                    .is_some()
                {
                    continue;
                }
                let key = issue.key.clone();
                let outcome = match self.import_issue(&issue, &config).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        self.ctx
                            .log_failed(Operation::Import, "", Some(&key), &e.to_string());
                        Outcome::Failed {
                            message: e.to_string(),
                            rate_limited: e.is_rate_limited(),
                        }
                    }
                };
                imported_issues.push(issue);
                report.results.push(MappingOutcome {
                    local_id: String::new(),
                    remote_key: key,
                    outcome,
                });
            }

            start_at += fetched;
            if start_at >= page.total {
                break;
            }
        }

        if !self.ctx.dry_run() {
            self.discover_assignees(&imported_issues).await?;
        }
        Ok(report)
    }

    async fn import_issue(
        &self,
        issue: &RemoteIssue,
        config: &SyncConfig,
    ) -> Result<Outcome, EngineError> {
        if self.ctx.dry_run() {
            return Ok(Outcome::DryRun(format!(
                "would import {} as a new local task",
                issue.key
            )));
        }

        let sections = extract_sections(&issue.description);
        let remote_payload = normalize_remote(issue, config);

        let new_task = NewTask {
            title: sanitize_title(&issue.summary),
            description: sections.body.clone(),
            status: config.canonical_status_for_remote(&issue.status, project_of(issue)),
            assignee: issue
                .assignee
                .as_deref()
                .and_then(|a| config.local_assignee_for(a))
                .map(str::to_string),
            labels: remote_payload.labels.clone(),
            priority: Some(remote_payload.priority),
            acceptance_criteria: sections
                .acceptance_criteria
                .iter()
                .map(|ac| AcceptanceCriterion::new(ac.text.clone(), ac.checked))
                .collect(),
        };

        let local_id = self.local.create_task(&new_task).await?;
        let task = self.local.get_task(&local_id).await?;
        let mapping = Mapping::new(&local_id, &issue.key);

        self.ctx.store().put_mapping(&mapping)?;
        self.ctx
            .write_snapshots(&local_id, &normalize_local(&task), &remote_payload)?;
        self.ctx
            .update_frontmatter(&task, &mapping, SyncState::InSync)?;
        self.ctx
            .log_ok(Operation::Import, &local_id, Some(&issue.key), None);
        Ok(Outcome::Imported)
    }

    /// Create a remote issue for an unmapped local task and bind it.
    pub async fn create_remote_issue(&self, local_id: &str) -> Result<String, EngineError> {
        let config = self.ctx.config();
        let task = self.local.get_task(local_id).await?;

        if let Some(existing) = self.ctx.store().get_mapping(local_id)? {
            return Err(EngineError::AlreadyMapped {
                local_id: local_id.to_string(),
                remote_key: existing.remote_key,
            });
        }
        let project = config.project_key.clone().ok_or_else(|| {
            EngineError::Refused {
                local_id: local_id.to_string(),
                reason: "no projectKey configured".to_string(),
            }
        })?;

        let local_payload = normalize_local(&task);
        let description = render_remote_description(
            &local_payload.description,
            &local_payload.acceptance_criteria,
            config
                .sync_plan_and_notes
                .then_some(task.implementation_plan.as_str()),
            config
                .sync_plan_and_notes
                .then_some(task.implementation_notes.as_str()),
        );

        let assignee = match &local_payload.assignee {
            Some(local_user) => {
                let mapped = config.remote_assignee_for(local_user).map(str::to_string);
                if mapped.is_none() {
                    warn!(
                        assignee = %local_user,
                        "no assignee mapping; creating unassigned (try `tether map-assignees`)",
                    );
                }
                mapped
            }
            None => None,
        };

        let fields = IssueFields {
            summary: None,
            description: Some(description),
            labels: (!local_payload.labels.is_empty()).then(|| local_payload.labels.clone()),
            priority_name: config.remote_priority_for(local_payload.priority, Some(&project)),
            assignee,
        };

        if self.ctx.dry_run() {
            return Ok(format!("dry-run: would create issue for {}", local_id));
        }

        let issue = self
            .remote
            .create_issue(&project, &config.issue_type, &local_payload.title, &fields)
            .await?;

        let mapping = Mapping::new(local_id, &issue.key);
        self.ctx.store().put_mapping(&mapping)?;

        // The created issue's observed state becomes the initial base.
        let refreshed = match self.remote.get_issue(&issue.key).await {
            Ok(issue) => issue,
            Err(_) => issue,
        };
        self.ctx.write_snapshots(
            local_id,
            &local_payload,
            &normalize_remote(&refreshed, &config),
        )?;
        self.ctx
            .update_frontmatter(&task, &mapping, SyncState::InSync)?;
        self.ctx
            .log_ok(Operation::Push, local_id, Some(&mapping.remote_key), Some("created"));
        Ok(mapping.remote_key)
    }

    /// Remove a mapping and clear the task's sync metadata.
    pub async fn unmap(&self, local_id: &str) -> Result<(), EngineError> {
        unmap_task(&self.local, &self.ctx, local_id).await
    }

    // ── shared per-mapping path ─────────────────────────────────────

    fn select_mappings(&self, selection: Option<&[String]>) -> Result<Vec<Mapping>, EngineError> {
        let store = self.ctx.store();
        match selection {
            None => Ok(store.list_mappings()?),
            Some(ids) => {
                let mut mappings = Vec::with_capacity(ids.len());
                for id in ids {
                    let mapping = store
                        .get_mapping(id)?
                        .or(store.get_mapping_by_remote_key(id)?)
                        .ok_or_else(|| EngineError::NotMapped(id.clone()))?;
                    mappings.push(mapping);
                }
                Ok(mappings)
            }
        }
    }

    /// Run one operation over many mappings in bounded concurrent
    /// batches. Mappings are disjoint, so no cross-mapping ordering is
    /// needed.
    async fn run_batched(&self, mappings: Vec<Mapping>, op: OpKind) -> SyncReport {
        let batch_size = self.ctx.config().batch_concurrency.max(1);
        let mut report = SyncReport::default();

        for chunk in mappings.chunks(batch_size) {
            let mut set = JoinSet::new();
            for mapping in chunk.iter().cloned() {
                let this = self.clone();
                set.spawn(async move {
                    let outcome = this.apply_op(&mapping, op, None).await;
                    (mapping, outcome)
                });
            }
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((mapping, outcome)) => {
                        report.results.push(self.finish(op, mapping, outcome));
                    }
                    Err(join_error) => {
                        warn!(error = %join_error, "reconciliation task panicked");
                    }
                }
            }
        }

        report.results.sort_by(|a, b| a.local_id.cmp(&b.local_id));
        report
    }

    /// Translate a per-mapping result into its report line and op-log
    /// entry. InSync and dry-run outcomes leave no audit trail.
    fn finish(
        &self,
        op: OpKind,
        mapping: Mapping,
        outcome: Result<Outcome, EngineError>,
    ) -> MappingOutcome {
        let outcome = match outcome {
            Ok(outcome) => {
                match &outcome {
                    Outcome::InSync | Outcome::DryRun(_) => {}
                    Outcome::Resolved => {
                        self.ctx.log_ok(
                            Operation::Resolve,
                            &mapping.local_id,
                            Some(&mapping.remote_key),
                            None,
                        );
                    }
                    Outcome::ManualRequired => {
                        self.ctx.log_failed(
                            Operation::Resolve,
                            &mapping.local_id,
                            Some(&mapping.remote_key),
                            "manual resolution required",
                        );
                    }
                    Outcome::Cancelled => {
                        self.ctx.log_failed(
                            Operation::Resolve,
                            &mapping.local_id,
                            Some(&mapping.remote_key),
                            "cancelled",
                        );
                    }
                    _ => {
                        self.ctx.log_ok(
                            op.log_operation(),
                            &mapping.local_id,
                            Some(&mapping.remote_key),
                            None,
                        );
                    }
                }
                outcome
            }
            Err(e) => {
                self.ctx.log_failed(
                    op.log_operation(),
                    &mapping.local_id,
                    Some(&mapping.remote_key),
                    &e.to_string(),
                );
                Outcome::Failed {
                    message: e.to_string(),
                    rate_limited: e.is_rate_limited(),
                }
            }
        };
        MappingOutcome {
            local_id: mapping.local_id,
            remote_key: mapping.remote_key,
            outcome,
        }
    }

    /// Load both sides concurrently, normalize, and classify.
    async fn load_pair(&self, mapping: &Mapping) -> Result<PairState, EngineError> {
        let config = self.ctx.config();
        let (task, issue) = tokio::join!(
            self.local.get_task(&mapping.local_id),
            self.remote.get_issue(&mapping.remote_key),
        );
        let task = task?;
        let issue = issue?;

        let local_payload = normalize_local(&task);
        let remote_payload = normalize_remote(&issue, &config);
        let current_local = payload_hash(&local_payload);
        let current_remote = payload_hash(&remote_payload);

        let snap_local = self.ctx.store().get_snapshot(&mapping.local_id, Side::Local)?;
        let snap_remote = self
            .ctx
            .store()
            .get_snapshot(&mapping.local_id, Side::Remote)?;

        let state = classify_sync_state(
            &current_local,
            &current_remote,
            snap_local.as_ref().map(|s| s.hash.as_str()),
            snap_remote.as_ref().map(|s| s.hash.as_str()),
        );

        Ok(PairState {
            task,
            issue,
            local_payload,
            remote_payload,
            base: snap_local.map(|s| s.payload),
            state,
        })
    }

    async fn apply_op(
        &self,
        mapping: &Mapping,
        op: OpKind,
        prompter: Option<&dyn ConflictPrompter>,
    ) -> Result<Outcome, EngineError> {
        let pair = self.load_pair(mapping).await?;
        match op {
            OpKind::Push { force } => self.op_push(mapping, pair, force).await,
            OpKind::Pull { force } => self.op_pull(mapping, pair, force).await,
            OpKind::Sync { strategy } => self.op_sync(mapping, pair, strategy, prompter).await,
        }
    }

    async fn op_push(
        &self,
        mapping: &Mapping,
        pair: PairState,
        force: bool,
    ) -> Result<Outcome, EngineError> {
        let refusal = |reason: &str| {
            Err(EngineError::Refused {
                local_id: mapping.local_id.clone(),
                reason: reason.to_string(),
            })
        };
        match pair.state {
            SyncState::InSync => Ok(Outcome::InSync),
            SyncState::NeedsPush => self.apply_push(mapping, &pair).await,
            SyncState::Unknown if force => self.apply_push(mapping, &pair).await,
            SyncState::Unknown => {
                refusal("state is unknown (missing snapshots); run sync, or push with --force")
            }
            SyncState::NeedsPull if force => self.apply_push(mapping, &pair).await,
            SyncState::NeedsPull => refusal("remote changed; pull first, or push with --force"),
            SyncState::Conflict if force => self.apply_push(mapping, &pair).await,
            SyncState::Conflict => {
                refusal("both sides changed; resolve with sync, or push with --force")
            }
        }
    }

    async fn op_pull(
        &self,
        mapping: &Mapping,
        pair: PairState,
        force: bool,
    ) -> Result<Outcome, EngineError> {
        let refusal = |reason: &str| {
            Err(EngineError::Refused {
                local_id: mapping.local_id.clone(),
                reason: reason.to_string(),
            })
        };
        match pair.state {
            SyncState::InSync => Ok(Outcome::InSync),
            SyncState::NeedsPull | SyncState::Unknown => self.apply_pull(mapping, &pair).await,
            SyncState::NeedsPush if force => self.apply_pull(mapping, &pair).await,
            SyncState::NeedsPush => refusal("local changed; push first, or pull with --force"),
            SyncState::Conflict if force => self.apply_pull(mapping, &pair).await,
            SyncState::Conflict => {
                refusal("both sides changed; resolve with sync, or pull with --force")
            }
        }
    }

    async fn op_sync(
        &self,
        mapping: &Mapping,
        pair: PairState,
        strategy: ConflictStrategy,
        prompter: Option<&dyn ConflictPrompter>,
    ) -> Result<Outcome, EngineError> {
        match pair.state {
            SyncState::InSync => Ok(Outcome::InSync),
            SyncState::NeedsPush => self.apply_push(mapping, &pair).await,
            SyncState::NeedsPull => self.apply_pull(mapping, &pair).await,
            // Missing snapshots: both sides exist (we just loaded them),
            // so push-then-refresh establishes a fresh base.
            SyncState::Unknown => self.apply_push(mapping, &pair).await,
            SyncState::Conflict => {
                self.resolve_conflict(mapping, &pair, strategy, prompter)
                    .await
            }
        }
    }

    /// Push = the desired state is the local payload.
    async fn apply_push(
        &self,
        mapping: &Mapping,
        pair: &PairState,
    ) -> Result<Outcome, EngineError> {
        if self.ctx.dry_run() {
            return Ok(Outcome::DryRun(describe_diff(
                &pair.local_payload,
                &pair.remote_payload,
                "push",
            )));
        }
        let desired = pair.local_payload.clone();
        self.apply_desired(mapping, pair, &desired, ApplySides::PUSH)
            .await?;
        Ok(Outcome::Pushed)
    }

    /// Pull = the desired state is the remote payload, except an
    /// unmapped remote status leaves the local status unchanged.
    async fn apply_pull(
        &self,
        mapping: &Mapping,
        pair: &PairState,
    ) -> Result<Outcome, EngineError> {
        if self.ctx.dry_run() {
            return Ok(Outcome::DryRun(describe_diff(
                &pair.remote_payload,
                &pair.local_payload,
                "pull",
            )));
        }
        let config = self.ctx.config();
        let mut desired = pair.remote_payload.clone();
        if config
            .canonical_status_for_remote(&pair.issue.status, project_of(&pair.issue))
            .is_none()
        {
            warn!(
                key = %mapping.remote_key,
                status = %pair.issue.status,
                "remote status has no mapping; leaving local status unchanged",
            );
            desired.status = pair.local_payload.status.clone();
        }
        self.apply_desired(mapping, pair, &desired, ApplySides::PULL)
            .await?;
        Ok(Outcome::Pulled)
    }

    async fn resolve_conflict(
        &self,
        mapping: &Mapping,
        pair: &PairState,
        strategy: ConflictStrategy,
        prompter: Option<&dyn ConflictPrompter>,
    ) -> Result<Outcome, EngineError> {
        let base = pair.base.clone().unwrap_or_default();

        if self.ctx.dry_run() {
            let conflicts = detect_field_conflicts(&base, &pair.local_payload, &pair.remote_payload);
            let fields: Vec<String> = conflicts.iter().map(|c| c.field.to_string()).collect();
            return Ok(Outcome::DryRun(format!(
                "conflict on {} (strategy {})",
                fields.join(", "),
                strategy
            )));
        }

        let desired = match strategy {
            ConflictStrategy::PreferLocal => {
                resolve::merge_prefer(&base, &pair.local_payload, &pair.remote_payload, true)
            }
            ConflictStrategy::PreferRemote => {
                resolve::merge_prefer(&base, &pair.local_payload, &pair.remote_payload, false)
            }
            ConflictStrategy::Manual => return Ok(Outcome::ManualRequired),
            ConflictStrategy::Prompt => {
                let prompter = prompter.ok_or(EngineError::PromptInWatch)?;
                let conflicts =
                    detect_field_conflicts(&base, &pair.local_payload, &pair.remote_payload);
                match prompter
                    .resolve_conflicts(&mapping.local_id, &mapping.remote_key, &conflicts)
                    .await?
                {
                    PromptOutcome::Cancelled => return Ok(Outcome::Cancelled),
                    PromptOutcome::Resolved {
                        resolution,
                        persist_strategy,
                    } => {
                        if let Some(strategy) = persist_strategy {
                            self.ctx
                                .update_config(|config| config.conflict_strategy = strategy)?;
                        }
                        resolve::apply_resolution(
                            &base,
                            &pair.local_payload,
                            &pair.remote_payload,
                            &resolution,
                        )?
                    }
                }
            }
        };

        self.apply_desired(mapping, pair, &desired, ApplySides::BOTH)
            .await?;
        Ok(Outcome::Resolved)
    }

    /// Drive both sides toward the desired payload, then refresh, write
    /// snapshots, and update frontmatter. The write order within the
    /// mapping is fixed: remote change, local change, snapshots,
    /// frontmatter.
    async fn apply_desired(
        &self,
        mapping: &Mapping,
        pair: &PairState,
        desired: &NormalizedPayload,
        sides: ApplySides,
    ) -> Result<(), EngineError> {
        let config = self.ctx.config();
        let project = project_of(&pair.issue);

        // Remote side
        let mut pushed_fields = false;
        let mut transitioned = false;
        if sides.remote {
            let fields = remote_field_diff(desired, pair, &config);
            pushed_fields = !fields.is_empty();
            if pushed_fields {
                self.remote.update_issue(&mapping.remote_key, &fields).await?;
            }
            if desired.status != pair.remote_payload.status {
                transitioned = self
                    .transition_status(&mapping.remote_key, &desired.status, project, &config)
                    .await?;
            }
        }

        // Local side
        let mut pulled = false;
        if sides.local {
            let update = local_task_diff(desired, pair, &config);
            pulled = !update.is_empty();
            if pulled {
                self.local.update_task(&mapping.local_id, &update).await?;
            }
        }

        // Refresh whichever sides changed so snapshots reflect the
        // post-operation observed state, not our intent.
        let (task, local_payload) = if pulled {
            let task = self.local.get_task(&mapping.local_id).await?;
            let payload = normalize_local(&task);
            (task, payload)
        } else {
            (pair.task.clone(), pair.local_payload.clone())
        };
        let remote_payload = if pushed_fields || transitioned {
            let issue = self.remote.get_issue(&mapping.remote_key).await?;
            normalize_remote(&issue, &config)
        } else {
            pair.remote_payload.clone()
        };

        self.ctx
            .write_snapshots(&mapping.local_id, &local_payload, &remote_payload)?;
        self.ctx
            .update_frontmatter(&task, mapping, SyncState::InSync)?;
        Ok(())
    }

    /// Change a remote status through the transition workflow. A missing
    /// transition is a warning, not a failure; the rest of the push
    /// stands.
    async fn transition_status(
        &self,
        remote_key: &str,
        target_status: &str,
        project: Option<&str>,
        config: &SyncConfig,
    ) -> Result<bool, EngineError> {
        let acceptable = config.remote_statuses_for(target_status, project);
        if acceptable.is_empty() {
            warn!(
                key = %remote_key,
                status = %target_status,
                "no statusMapping entry for target status; skipping transition",
            );
            return Ok(false);
        }

        let transitions = self.remote.get_transitions(remote_key).await?;
        match find_transition(&transitions, &acceptable) {
            Some(transition) => {
                let comment = format!(
                    "Status changed to '{}' by tether sync",
                    transition.to_status.as_deref().unwrap_or(target_status)
                );
                self.remote
                    .transition_issue(remote_key, &transition.id, Some(&comment))
                    .await?;
                Ok(true)
            }
            None => {
                warn!(
                    key = %remote_key,
                    target = %target_status,
                    available = %describe_transitions(&transitions),
                    "no transition matches target status; field updates applied without it",
                );
                Ok(false)
            }
        }
    }

    /// Fuzzy assignee auto-discovery over the distinct local assignees
    /// and the remote assignees seen during import/pull.
    async fn discover_assignees(&self, issues: &[RemoteIssue]) -> Result<(), EngineError> {
        let remote_assignees: Vec<String> = {
            let mut seen = Vec::new();
            for issue in issues {
                if let Some(a) = &issue.assignee {
                    if !a.is_empty() && !seen.contains(a) {
                        seen.push(a.clone());
                    }
                }
            }
            seen
        };
        if remote_assignees.is_empty() {
            return Ok(());
        }

        let tasks = self.local.list_tasks(&TaskFilter::default()).await?;
        let config = self.ctx.config();
        let discovered =
            crate::mapper::discover_assignee_mappings(&tasks, &remote_assignees, &config);
        if discovered.is_empty() {
            return Ok(());
        }

        self.ctx.update_config(|config| {
            for (local, remote) in &discovered {
                config
                    .auto_mapped_assignees
                    .insert(local.clone(), remote.clone());
            }
        })?;
        Ok(())
    }
}

/// Remove a mapping (and its snapshots) and clear the task's sync
/// metadata. Needs no remote connection, so the CLI can unmap offline.
pub async fn unmap_task<L: LocalAdapter>(
    local: &L,
    ctx: &SyncContext,
    local_id: &str,
) -> Result<(), EngineError> {
    let mapping = ctx
        .store()
        .get_mapping(local_id)?
        .ok_or_else(|| EngineError::NotMapped(local_id.to_string()))?;

    if ctx.dry_run() {
        return Ok(());
    }

    ctx.store().delete_mapping(local_id)?;
    if let Ok(task) = local.get_task(local_id).await {
        ctx.clear_frontmatter(&task)?;
    }
    ctx.log_ok(Operation::Unmap, local_id, Some(&mapping.remote_key), None);
    Ok(())
}

fn import_jql(config: &SyncConfig) -> Option<String> {
    config.jql_filter.clone().or_else(|| {
        config
            .project_key
            .as_ref()
            .map(|key| format!("project = {}", key))
    })
}

fn project_of(issue: &RemoteIssue) -> Option<&str> {
    tether_core::normalize::project_of_key(&issue.key)
}

/// Build the remote field updates that move the issue toward `desired`.
fn remote_field_diff(
    desired: &NormalizedPayload,
    pair: &PairState,
    config: &SyncConfig,
) -> IssueFields {
    let current = &pair.remote_payload;
    let project = project_of(&pair.issue);
    let mut fields = IssueFields::default();

    if desired.title != current.title {
        fields.summary = Some(desired.title.clone());
    }

    let remote_sections = extract_sections(&pair.issue.description);
    let (plan, notes) = if config.sync_plan_and_notes {
        (
            Some(pair.task.implementation_plan.clone()).filter(|s| !s.is_empty()),
            Some(pair.task.implementation_notes.clone()).filter(|s| !s.is_empty()),
        )
    } else {
        (remote_sections.plan.clone(), remote_sections.notes.clone())
    };
    let description_changed = desired.description != current.description
        || desired.acceptance_criteria != current.acceptance_criteria
        || (config.sync_plan_and_notes
            && (plan != remote_sections.plan || notes != remote_sections.notes));
    if description_changed {
        fields.description = Some(render_remote_description(
            &desired.description,
            &desired.acceptance_criteria,
            plan.as_deref(),
            notes.as_deref(),
        ));
    }

    if desired.labels != current.labels {
        fields.labels = Some(desired.labels.clone());
    }

    if desired.priority != current.priority {
        match config.remote_priority_for(desired.priority, project) {
            Some(name) => fields.priority_name = Some(name),
            None => warn!(
                priority = %desired.priority,
                "no priorityMapping entry; skipping priority update",
            ),
        }
    }

    if desired.assignee != current.assignee {
        match &desired.assignee {
            None => fields.assignee = Some(String::new()),
            Some(local_user) => match config.remote_assignee_for(local_user) {
                Some(remote_user) => fields.assignee = Some(remote_user.to_string()),
                None => warn!(
                    assignee = %local_user,
                    "no assignee mapping; skipping assignee update (try `tether map-assignees`)",
                ),
            },
        }
    }

    fields
}

/// Build the local CLI update that moves the task toward `desired`.
fn local_task_diff(
    desired: &NormalizedPayload,
    pair: &PairState,
    config: &SyncConfig,
) -> TaskUpdate {
    let current = &pair.local_payload;
    let mut update = TaskUpdate::default();

    if desired.title != current.title {
        update.title = Some(desired.title.clone());
    }
    if desired.description != current.description {
        update.description = Some(desired.description.clone());
    }
    if desired.status != current.status {
        update.status = Some(desired.status.clone());
    }
    if desired.priority != current.priority {
        update.priority = Some(desired.priority);
    }
    if desired.labels != current.labels {
        update.labels = Some(desired.labels.clone());
    }
    if desired.assignee != current.assignee {
        update.assignee = Some(match &desired.assignee {
            None => String::new(),
            Some(remote_user) => config
                .local_assignee_for(remote_user)
                .unwrap_or(remote_user.as_str())
                .to_string(),
        });
    }
    if desired.acceptance_criteria != current.acceptance_criteria {
        ac_full_replace(
            &mut update,
            &pair.task.acceptance_criteria,
            &desired.acceptance_criteria,
        );
    }
    update
}

/// Full-replacement AC diff: remove local items whose text is gone
/// (indices descending so earlier removals don't shift later ones), add
/// missing items, then fix checked states against the resulting list.
fn ac_full_replace(update: &mut TaskUpdate, local: &[AcceptanceCriterion], desired: &[AcItem]) {
    let desired_texts: Vec<&str> = desired.iter().map(|ac| ac.text.as_str()).collect();
    let local_texts: Vec<&str> = local.iter().map(|ac| ac.text.trim()).collect();

    // Remove items not present in the desired list
    let mut removals: Vec<usize> = local_texts
        .iter()
        .enumerate()
        .filter(|(_, text)| !desired_texts.contains(text))
        .map(|(i, _)| i + 1)
        .collect();
    removals.reverse();
    update.remove_ac = removals;

    // Add desired items not present locally
    update.add_ac = desired
        .iter()
        .filter(|ac| !local_texts.contains(&ac.text.as_str()))
        .map(|ac| ac.text.clone())
        .collect();

    // The list after removals and additions: surviving local items in
    // order, then the added items (created unchecked).
    let survivors: Vec<(String, bool)> = local
        .iter()
        .filter(|ac| desired_texts.contains(&ac.text.trim()))
        .map(|ac| (ac.text.trim().to_string(), ac.checked))
        .collect();
    let mut final_list: Vec<(String, bool)> = survivors;
    for text in &update.add_ac {
        final_list.push((text.clone(), false));
    }

    for (index, (text, checked)) in final_list.iter().enumerate() {
        let wanted = desired
            .iter()
            .find(|ac| &ac.text == text)
            .map(|ac| ac.checked)
            .unwrap_or(*checked);
        if wanted && !*checked {
            update.check_ac.push(index + 1);
        } else if !wanted && *checked {
            update.uncheck_ac.push(index + 1);
        }
    }
}

/// One-line description of the differing fields for dry-run output.
fn describe_diff(from: &NormalizedPayload, to: &NormalizedPayload, verb: &str) -> String {
    let mut fields = Vec::new();
    if from.title != to.title {
        fields.push("title");
    }
    if from.description != to.description {
        fields.push("description");
    }
    if from.status != to.status {
        fields.push("status");
    }
    if from.priority != to.priority {
        fields.push("priority");
    }
    if from.labels != to.labels {
        fields.push("labels");
    }
    if from.assignee != to.assignee {
        fields.push("assignee");
    }
    if from.acceptance_criteria != to.acceptance_criteria {
        fields.push("acceptance criteria");
    }
    if fields.is_empty() {
        format!("would {} (no field changes)", verb)
    } else {
        format!("would {} {}", verb, fields.join(", "))
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
