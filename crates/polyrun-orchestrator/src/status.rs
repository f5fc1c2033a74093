// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Execution status merge engine.
//!
//! Task handlers push progressive status updates against the resource store
//! directly, independent of the orchestrator. This engine applies each
//! partial update without clobbering the fields it does not mention.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use polyrun_types::{Execution, StatusUpdate, UpdateStatusRequest};

use crate::error::{OrchestratorError, Result};
use crate::store::{EXECUTION_KIND, ResourceStore};

/// Applies partial status updates to persisted execution records.
///
/// Single-writer-per-execution is an external contract this engine assumes
/// but does not enforce: there is no version token, so concurrent writers
/// for one execution id land last-writer-wins.
pub struct StatusMerger {
    store: Arc<dyn ResourceStore>,
}

impl StatusMerger {
    /// Create a merge engine over the given resource store.
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Status-update entry point.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` when `execution_id` is empty or `status` is absent
    /// - `NotFound` when no execution record exists for `execution_id`
    #[instrument(skip(self, request), fields(execution_id = %request.execution_id))]
    pub async fn handle_update_status(&self, request: UpdateStatusRequest) -> Result<Execution> {
        let Some(status) = request.status else {
            return Err(OrchestratorError::InvalidArgument(
                "status is required".to_string(),
            ));
        };
        self.apply_status_update(&request.execution_id, &status).await
    }

    /// Load, merge, and persist a status update, returning the merged
    /// execution. Refreshes `audit.updated_at`; never touches
    /// `audit.created_at`.
    pub async fn apply_status_update(
        &self,
        execution_id: &str,
        update: &StatusUpdate,
    ) -> Result<Execution> {
        if execution_id.is_empty() {
            return Err(OrchestratorError::InvalidArgument(
                "execution_id is required".to_string(),
            ));
        }

        let record = self
            .store
            .get_resource(EXECUTION_KIND, execution_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound {
                kind: EXECUTION_KIND.to_string(),
                id: execution_id.to_string(),
            })?;
        let mut execution: Execution = serde_json::from_value(record)?;

        debug!(phase = ?execution.phase, "Loaded existing execution");

        merge_status(&mut execution, update);

        // updated_at must strictly increase even when the clock tick is
        // coarser than back-to-back merges.
        let now = Utc::now();
        execution.audit.updated_at = if now > execution.audit.updated_at {
            now
        } else {
            execution.audit.updated_at + Duration::nanoseconds(1)
        };

        self.store
            .save_resource(EXECUTION_KIND, execution_id, &serde_json::to_value(&execution)?)
            .await?;

        info!(
            phase = ?execution.phase,
            tasks = execution.tasks.len(),
            "Merged and persisted execution status"
        );

        Ok(execution)
    }
}

/// Merge an update into an execution, field by field.
///
/// - `phase` applies unless it is `Unspecified`. Advance-only ordering is
///   the producer's contract, not checked here.
/// - `tasks` replaces the stored transcript wholesale when present —
///   producers send full snapshots, not deltas.
/// - Remaining fields apply only when they carry a non-empty value; an
///   omitted field never clears stored state.
fn merge_status(execution: &mut Execution, update: &StatusUpdate) {
    if !update.phase.is_unspecified() {
        execution.phase = update.phase;
    }
    if let Some(tasks) = &update.tasks {
        execution.tasks = tasks.clone();
    }
    if let Some(output) = &update.output {
        execution.output = Some(output.clone());
    }
    if let Some(error) = non_empty(update.error.as_deref()) {
        execution.error = Some(error.to_string());
    }
    if let Some(started_at) = update.started_at {
        execution.started_at = Some(started_at);
    }
    if let Some(completed_at) = update.completed_at {
        execution.completed_at = Some(completed_at);
    }
    if let Some(engine_run_id) = non_empty(update.engine_run_id.as_deref()) {
        execution.engine_run_id = Some(engine_run_id.to_string());
    }
}

/// Explicit emptiness predicate for optional string fields.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
