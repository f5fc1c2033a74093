// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cross-runtime dispatch contract.
//!
//! Task handlers are resolved by plain string name, matched case-sensitively
//! by whatever worker registered that name on the activity queue. No type
//! system verifies the pairing across runtimes — every name below must be
//! covered by an integration test against each worker implementation that
//! claims to register it.

use serde::{Deserialize, Serialize};

use crate::execution::Execution;

/// Version of the dispatch contract.
///
/// Bump whenever a task name, input shape, or output shape changes in a way
/// an already-deployed worker would not understand.
pub const CONTRACT_VERSION: u32 = 1;

/// Ensure the session handle for an execution exists. Remote; implemented by
/// the task-handler runtime.
pub const TASK_ENSURE_SESSION: &str = "ensure_session";

/// Execute the agent for an execution. Remote; implemented by the
/// task-handler runtime, which pushes progressive status updates directly to
/// the status merge engine while running.
pub const TASK_EXECUTE_AGENT: &str = "execute_agent";

/// Apply a status update to an execution record. Registered only in the
/// orchestrator's own process and invoked via local dispatch, so the
/// failure-recovery path never depends on a remote worker.
pub const TASK_UPDATE_EXECUTION_STATUS: &str = "update_execution_status";

/// Immutable metadata attached to a run when it is scheduled.
///
/// Resolved once from deployment configuration by the creation-time caller
/// and carried through the run unchanged. The orchestrator reads it but
/// never recomputes it from the environment, so replay always observes the
/// same values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMemo {
    /// Queue the cross-runtime task handlers listen on. `None` falls back
    /// to the orchestrator's documented default queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_queue: Option<String>,
    /// Contract version the scheduling caller was built against.
    #[serde(default)]
    pub contract_version: u32,
}

impl RunMemo {
    /// Memo routing activities to the given queue under the current
    /// contract version.
    pub fn for_queue(activity_queue: impl Into<String>) -> Self {
        Self {
            activity_queue: Some(activity_queue.into()),
            contract_version: CONTRACT_VERSION,
        }
    }
}

/// Input of [`TASK_ENSURE_SESSION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureSessionInput {
    /// Logical session identity.
    pub session_id: String,
    /// Agent the session belongs to.
    pub agent_id: String,
}

/// Output of [`TASK_ENSURE_SESSION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureSessionOutput {
    /// Opaque handle token for the ensured session.
    pub session_handle: String,
}

/// Input of [`TASK_EXECUTE_AGENT`].
///
/// The output of [`TASK_EXECUTE_AGENT`] is a `StatusUpdate`: the handler's
/// best-effort final status, informational only. Authoritative transitions
/// travel through the status merge engine instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteAgentInput {
    /// The execution to run.
    pub execution: Execution,
    /// Session handle obtained from [`TASK_ENSURE_SESSION`].
    pub session_handle: String,
}
