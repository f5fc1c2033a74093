// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared contract types for polyrun executions.
//!
//! Executions are orchestrated in one runtime while their task handlers may
//! live in another. Everything that crosses that boundary — the execution
//! record, the progressive status projection, the dispatch task names and
//! their input/output shapes — is defined here as plain serde types, so
//! every runtime serializes against the same versioned contract.
//!
//! Handlers are addressed by string name with no compile-time verification
//! across runtimes. This crate plus the per-name integration tests in
//! `polyrun-orchestrator` are the guard rail for that.

mod contract;
mod execution;

pub use contract::{
    CONTRACT_VERSION, EnsureSessionInput, EnsureSessionOutput, ExecuteAgentInput, RunMemo,
    TASK_ENSURE_SESSION, TASK_EXECUTE_AGENT, TASK_UPDATE_EXECUTION_STATUS,
};
pub use execution::{
    AuditBlock, Execution, ExecutionPhase, StatusUpdate, TaskKind, TaskStatus, UpdateStatusRequest,
};
