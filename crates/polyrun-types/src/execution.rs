// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Execution record and progressive status projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse lifecycle phase of an execution.
///
/// A phase only ever advances `Pending` → `InProgress` → one of the terminal
/// phases. Producers own that invariant; the merge engine only refuses to
/// overwrite a stored phase with `Unspecified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionPhase {
    /// No phase supplied — leave the stored phase untouched.
    #[default]
    Unspecified,
    /// Execution record exists, orchestration not started.
    Pending,
    /// The task handler is executing.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

impl ExecutionPhase {
    /// Whether this is the no-change sentinel.
    pub fn is_unspecified(self) -> bool {
        self == ExecutionPhase::Unspecified
    }

    /// Whether this phase ends the execution's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionPhase::Completed | ExecutionPhase::Failed | ExecutionPhase::Cancelled
        )
    }
}

/// Kind of entry in an execution's sub-task transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Work performed by the agent itself.
    Agent,
    /// A tool invocation made on the agent's behalf.
    Tool,
    /// Diagnostic entry authored by the orchestration layer.
    System,
}

/// One entry of the ordered sub-task transcript.
///
/// Task handlers send the full current transcript with every progressive
/// update; the merge engine replaces the stored list wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    /// What produced this entry.
    pub kind: TaskKind,
    /// Human-readable content of the entry.
    pub content: String,
}

impl TaskStatus {
    /// Build a system-authored diagnostic entry.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::System,
            content: content.into(),
        }
    }
}

/// Creation and modification timestamps of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditBlock {
    /// When the record was created. Never modified afterwards.
    pub created_at: DateTime<Utc>,
    /// When the record was last merged. Strictly increases on every
    /// successful status merge.
    pub updated_at: DateTime<Utc>,
}

impl AuditBlock {
    /// Audit block for a freshly created record.
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single agent or workflow execution.
///
/// Owned by the orchestration subsystem once created; mutated only through
/// the status merge engine and never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Unique execution identifier.
    pub id: String,
    /// Logical session this execution belongs to.
    pub session_id: String,
    /// Agent or workflow identity being executed.
    pub agent_id: String,
    /// Correlation id of the durable-engine run driving this execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_run_id: Option<String>,
    /// Current lifecycle phase.
    pub phase: ExecutionPhase,
    /// Ordered sub-task transcript.
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
    /// Output payload. Semi-structured; oversized fields may be replaced by
    /// claim-check references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error message if the execution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the task handler started work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the execution reached a terminal phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Record audit timestamps.
    pub audit: AuditBlock,
}

impl Execution {
    /// Create a pending execution record.
    pub fn new(
        id: impl Into<String>,
        session_id: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            session_id: session_id.into(),
            agent_id: agent_id.into(),
            engine_run_id: None,
            phase: ExecutionPhase::Pending,
            tasks: Vec::new(),
            output: None,
            error: None,
            started_at: None,
            completed_at: None,
            audit: AuditBlock::now(),
        }
    }
}

/// Partial projection of an execution's mutable status fields.
///
/// Any absent field means "do not change". `tasks`, when present, replaces
/// the stored transcript wholesale — producers always send full snapshots.
/// Produced once per progress event by the task handler, and once by the
/// orchestrator's failure-recovery path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// New phase, or `Unspecified` to keep the stored one.
    #[serde(default)]
    pub phase: ExecutionPhase,
    /// Full replacement transcript, or `None` to keep the stored one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskStatus>>,
    /// Output payload. Applied only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error message. Applied only when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Start timestamp. Applied only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp. Applied only when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Durable-engine correlation id. Applied only when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_run_id: Option<String>,
}

/// Wire input of the status-update entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    /// Execution to update. Required.
    pub execution_id: String,
    /// Fields to merge. Required.
    pub status: Option<StatusUpdate>,
}
