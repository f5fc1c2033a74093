// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Worker registration surface for the orchestration queue.
//!
//! Each worker registers ONLY what its own process implements:
//!
//! - This worker (orchestration queue): the workflow driver plus
//!   `update_execution_status`, kept in-process so the failure-recovery
//!   path has no remote dependency.
//! - The task-handler worker (activity queue, possibly another runtime):
//!   `ensure_session` and `execute_agent` — deliberately NOT registered
//!   here. Registering a name on the wrong pool silently steals its tasks
//!   from the pool that can actually run them.

use std::sync::Arc;

use tracing::{debug, instrument};

use polyrun_types::{TASK_UPDATE_EXECUTION_STATUS, UpdateStatusRequest};

use crate::error::{OrchestratorError, Result};
use crate::status::StatusMerger;

/// Routes tasks arriving on the orchestration queue to their in-process
/// handlers.
pub struct OrchestrationWorker {
    queue: String,
    merger: Arc<StatusMerger>,
}

impl OrchestrationWorker {
    /// Create a worker for the given orchestration queue.
    pub fn new(queue: impl Into<String>, merger: Arc<StatusMerger>) -> Self {
        Self {
            queue: queue.into(),
            merger,
        }
    }

    /// Queue this worker polls.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Entry point the durable engine calls for each dispatched task.
    ///
    /// Task names match case-sensitively; an unregistered name is a
    /// dispatch error, not a silent no-op.
    #[instrument(skip(self, input), fields(queue = %self.queue, task = task))]
    pub async fn handle_task(&self, task: &str, input: &[u8]) -> Result<Vec<u8>> {
        debug!(input_size = input.len(), "Handling dispatched task");
        match task {
            TASK_UPDATE_EXECUTION_STATUS => {
                let request: UpdateStatusRequest = serde_json::from_slice(input)?;
                let execution = self.merger.handle_update_status(request).await?;
                Ok(serde_json::to_vec(&execution)?)
            }
            other => Err(OrchestratorError::Dispatch {
                task: other.to_string(),
                queue: self.queue.clone(),
                reason: "task not registered on this queue".to_string(),
            }),
        }
    }
}
