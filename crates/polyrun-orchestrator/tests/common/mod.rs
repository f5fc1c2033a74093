// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Common test infrastructure for orchestrator integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use polyrun_orchestrator::dispatch::{DispatchOptions, TaskDispatcher};
use polyrun_orchestrator::store::{EXECUTION_KIND, MemoryResourceStore, ResourceStore};
use polyrun_orchestrator::{OrchestratorError, Result};
use polyrun_types::{
    EnsureSessionOutput, ExecuteAgentInput, Execution, ExecutionPhase, StatusUpdate,
    TASK_ENSURE_SESSION, TASK_EXECUTE_AGENT,
};

/// How the scripted activity worker behaves.
pub enum HandlerBehavior {
    /// Both handlers answer normally.
    Healthy,
    /// `execute_agent` returns a null final status (contract violation).
    NullFinalStatus,
    /// The activity queue is completely unreachable.
    Unreachable,
    /// Handlers answer normally, but only after this delay.
    Slow(Duration),
}

/// Scripted stand-in for the remote activity worker pool.
pub struct ScriptedDispatcher {
    pub behavior: HandlerBehavior,
    pub final_status: StatusUpdate,
    calls: Mutex<Vec<(String, String)>>,
    last_execute_input: Mutex<Option<ExecuteAgentInput>>,
}

impl ScriptedDispatcher {
    pub fn new(behavior: HandlerBehavior) -> Self {
        Self {
            behavior,
            final_status: StatusUpdate {
                phase: ExecutionPhase::Completed,
                ..Default::default()
            },
            calls: Mutex::new(Vec::new()),
            last_execute_input: Mutex::new(None),
        }
    }

    pub fn healthy() -> Self {
        Self::new(HandlerBehavior::Healthy)
    }

    pub fn with_final_status(mut self, final_status: StatusUpdate) -> Self {
        self.final_status = final_status;
        self
    }

    /// Every (queue, task) pair this dispatcher saw, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// The parsed input of the last `execute_agent` dispatch.
    pub fn last_execute_input(&self) -> Option<ExecuteAgentInput> {
        self.last_execute_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskDispatcher for ScriptedDispatcher {
    async fn dispatch(
        &self,
        queue: &str,
        task: &str,
        input: Vec<u8>,
        _options: &DispatchOptions,
    ) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push((queue.to_string(), task.to_string()));

        match self.behavior {
            HandlerBehavior::Unreachable => {
                return Err(OrchestratorError::Dispatch {
                    task: task.to_string(),
                    queue: queue.to_string(),
                    reason: "no worker polling queue".to_string(),
                });
            }
            HandlerBehavior::Slow(delay) => tokio::time::sleep(delay).await,
            _ => {}
        }

        match task {
            TASK_ENSURE_SESSION => Ok(serde_json::to_vec(&EnsureSessionOutput {
                session_handle: "handle-1".to_string(),
            })?),
            TASK_EXECUTE_AGENT => {
                let parsed: ExecuteAgentInput = serde_json::from_slice(&input)?;
                *self.last_execute_input.lock().unwrap() = Some(parsed);
                if matches!(self.behavior, HandlerBehavior::NullFinalStatus) {
                    Ok(b"null".to_vec())
                } else {
                    Ok(serde_json::to_vec(&Some(self.final_status.clone()))?)
                }
            }
            other => Err(OrchestratorError::Dispatch {
                task: other.to_string(),
                queue: queue.to_string(),
                reason: "task not registered on this queue".to_string(),
            }),
        }
    }
}

/// Persist a fresh pending execution and return it.
pub async fn seed_execution(store: &MemoryResourceStore, id: &str) -> Execution {
    let execution = Execution::new(id, "session-1", "agent-1");
    store
        .save_resource(
            EXECUTION_KIND,
            id,
            &serde_json::to_value(&execution).unwrap(),
        )
        .await
        .unwrap();
    execution
}

/// Load an execution back out of the store.
pub async fn load_execution(store: &MemoryResourceStore, id: &str) -> Execution {
    let record = store
        .get_resource(EXECUTION_KIND, id)
        .await
        .unwrap()
        .expect("execution record missing");
    serde_json::from_value(record).unwrap()
}
