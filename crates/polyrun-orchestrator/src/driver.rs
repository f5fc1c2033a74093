// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Durable workflow driver for one execution.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, instrument};

use polyrun_claimcheck::ClaimCheckManager;
use polyrun_types::{
    EnsureSessionInput, EnsureSessionOutput, ExecuteAgentInput, Execution, ExecutionPhase, RunMemo,
    StatusUpdate, TASK_ENSURE_SESSION, TASK_EXECUTE_AGENT, TASK_UPDATE_EXECUTION_STATUS,
    TaskStatus,
};

use crate::dispatch::{
    DEFAULT_ACTIVITY_QUEUE, DispatchOptions, TaskDispatcher, call_remote, with_local_retry,
};
use crate::error::{OrchestratorError, Result};
use crate::status::StatusMerger;

/// Diagnostic shown to users when an execution fails for infrastructure
/// reasons rather than through the task handler's own error reporting.
const INTERNAL_ERROR_NOTICE: &str =
    "Internal system error occurred during execution. Please contact support if this issue persists.";

/// Time and retry bounds for one run.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Overall bound on one run (default: 10 minutes). Hitting it takes the
    /// same failure path as any other orchestration-level error.
    pub run_timeout: Duration,
    /// Bounds for remote task dispatch.
    pub remote: DispatchOptions,
    /// Bounds for the local recovery dispatch.
    pub local: DispatchOptions,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            run_timeout: Duration::from_secs(600),
            remote: DispatchOptions::remote(),
            local: DispatchOptions::local(),
        }
    }
}

/// Replay-safe coordination logic for one execution.
///
/// The driver sequences the run's steps and awaits each dispatch; it holds
/// no other concurrency and performs no I/O of its own. The task handler —
/// possibly in another runtime — owns every authoritative phase transition
/// via its progressive status updates; the driver forces one only on
/// orchestration-level failure, through the in-process merge engine.
pub struct ExecutionDriver {
    dispatcher: Arc<dyn TaskDispatcher>,
    merger: Arc<StatusMerger>,
    claim_check: Option<Arc<ClaimCheckManager>>,
    options: DriverOptions,
}

impl ExecutionDriver {
    /// Create a driver over the engine's dispatcher and the in-process
    /// merge engine.
    pub fn new(dispatcher: Arc<dyn TaskDispatcher>, merger: Arc<StatusMerger>) -> Self {
        Self {
            dispatcher,
            merger,
            claim_check: None,
            options: DriverOptions::default(),
        }
    }

    /// Attach a claim-check manager for step input/output offloading.
    pub fn with_claim_check(mut self, manager: Arc<ClaimCheckManager>) -> Self {
        self.claim_check = Some(manager);
        self
    }

    /// Override the default time and retry bounds.
    pub fn with_options(mut self, options: DriverOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the execution to completion.
    ///
    /// Returns the task handler's best-effort final status — informational
    /// only; authoritative status lives in the resource store. On any
    /// orchestration-level error the execution is forced to `FAILED`
    /// through local dispatch and the original error is re-raised so the
    /// durable engine records the failure.
    #[instrument(skip(self, execution, memo), fields(execution_id = %execution.id))]
    pub async fn run(&self, execution: Execution, memo: &RunMemo) -> Result<StatusUpdate> {
        let execution_id = execution.id.clone();
        info!("Starting workflow for execution");

        let flow = self.execute_flow(execution, memo);
        let result = match tokio::time::timeout(self.options.run_timeout, flow).await {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::Timeout {
                operation: "execution run".to_string(),
                after_ms: self.options.run_timeout.as_millis() as u64,
            }),
        };

        match result {
            Ok(final_status) => {
                info!("Workflow completed for execution (status updates were pushed progressively)");
                Ok(final_status)
            }
            Err(err) => {
                error!(error = %err, "Workflow execution failed");
                if let Err(update_err) = self.mark_failed(&execution_id, &err).await {
                    // Recovery failure must not suppress the original error.
                    error!(error = %update_err, "Failed to update execution status");
                }
                Err(err)
            }
        }
    }

    /// The step sequence: ensure session, then execute the agent.
    async fn execute_flow(&self, execution: Execution, memo: &RunMemo) -> Result<StatusUpdate> {
        let activity_queue = memo
            .activity_queue
            .as_deref()
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_ACTIVITY_QUEUE);

        // Step 1: ensure the session handle exists (cross-runtime).
        info!(
            session_id = %execution.session_id,
            agent_id = %execution.agent_id,
            queue = activity_queue,
            "Step 1: ensuring session"
        );
        let session: EnsureSessionOutput = call_remote(
            self.dispatcher.as_ref(),
            activity_queue,
            TASK_ENSURE_SESSION,
            &EnsureSessionInput {
                session_id: execution.session_id.clone(),
                agent_id: execution.agent_id.clone(),
            },
            &self.options.remote,
        )
        .await?;
        info!(session_handle = %session.session_handle, "Session ensured");

        // Step 2: execute the agent (cross-runtime). The handler pushes
        // progressive status updates directly while running; the returned
        // final status is informational only.
        let mut execution = execution;
        execution.output = self.rehydrate_output(execution.output).await;

        info!(queue = activity_queue, "Step 2: executing agent");
        let final_status: Option<StatusUpdate> = call_remote(
            self.dispatcher.as_ref(),
            activity_queue,
            TASK_EXECUTE_AGENT,
            &ExecuteAgentInput {
                execution,
                session_handle: session.session_handle,
            },
            &self.options.remote,
        )
        .await?;

        let Some(mut final_status) = final_status else {
            error!("Agent handler returned no final status");
            return Err(OrchestratorError::ContractViolation {
                task: TASK_EXECUTE_AGENT.to_string(),
                reason: "handler returned no final status".to_string(),
            });
        };

        final_status.output = self.offload_output(final_status.output).await;

        info!(
            phase = ?final_status.phase,
            tasks = final_status.tasks.as_ref().map_or(0, Vec::len),
            "Agent execution completed - final status received"
        );
        Ok(final_status)
    }

    /// Rehydrate claim-check references in an output document before it
    /// crosses to the task handler.
    async fn rehydrate_output(&self, output: Option<Value>) -> Option<Value> {
        match (output, &self.claim_check) {
            (Some(Value::Object(document)), Some(manager)) => {
                Some(Value::Object(manager.retrieve_fields(document).await))
            }
            (output, _) => output,
        }
    }

    /// Offload oversized fields of an output document so the engine's run
    /// history stays small.
    async fn offload_output(&self, output: Option<Value>) -> Option<Value> {
        match (output, &self.claim_check) {
            (Some(Value::Object(document)), Some(manager)) => {
                Some(Value::Object(manager.offload_fields(document).await))
            }
            (output, _) => output,
        }
    }

    /// Force a terminal FAILED status after an orchestration-level error.
    ///
    /// Runs as a local dispatch against the in-process merge engine: at
    /// this point the remote activity worker may itself be the failure
    /// source and must not be a dependency of the recovery path.
    async fn mark_failed(
        &self,
        execution_id: &str,
        original: &OrchestratorError,
    ) -> Result<Execution> {
        info!(execution_id, "Updating execution status to FAILED");

        let failed_status = StatusUpdate {
            phase: ExecutionPhase::Failed,
            tasks: Some(vec![
                TaskStatus::system(INTERNAL_ERROR_NOTICE),
                TaskStatus::system(format!("Error details: {}", original)),
            ]),
            ..Default::default()
        };

        let merged = with_local_retry(TASK_UPDATE_EXECUTION_STATUS, &self.options.local, || {
            let update = failed_status.clone();
            async move { self.merger.apply_status_update(execution_id, &update).await }
        })
        .await?;

        info!(execution_id, "Updated execution status to FAILED");
        Ok(merged)
    }
}
