// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Orchestrator error types.
//!
//! Infra failures (dispatch, contract violations, timeouts) trigger the
//! driver's recovery path. An application failure authored by the task
//! handler is not an error at this layer at all: it arrives as progressive
//! status content (phase `FAILED` plus the handler's own error text) and
//! merges like any other update.

use thiserror::Error;

/// Errors that can occur in the orchestration layer.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A required identifier or field was missing or malformed (caller bug).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced resource does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Resource kind that was looked up.
        kind: String,
        /// Identifier that was not found.
        id: String,
    },

    /// The resource store failed.
    #[error("storage failure during '{operation}': {details}")]
    Storage {
        /// The store operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },

    /// Dispatching a task to a queue failed.
    #[error("dispatch of '{task}' on queue '{queue}' failed: {reason}")]
    Dispatch {
        /// Task name that was dispatched.
        task: String,
        /// Queue the task was routed to.
        queue: String,
        /// Error details.
        reason: String,
    },

    /// A task handler violated the dispatch contract.
    #[error("task '{task}' violated its contract: {reason}")]
    ContractViolation {
        /// Task name whose handler misbehaved.
        task: String,
        /// What the handler did wrong.
        reason: String,
    },

    /// An operation exceeded its time bound.
    #[error("'{operation}' timed out after {after_ms} ms")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The bound that was exceeded, in milliseconds.
        after_ms: u64,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestratorError {
    /// Whether this is an orchestration-infrastructure failure.
    ///
    /// Infra failures — and only infra failures — send the driver down the
    /// local recovery path before being re-raised.
    pub fn is_infra(&self) -> bool {
        matches!(
            self,
            Self::Dispatch { .. } | Self::ContractViolation { .. } | Self::Timeout { .. }
        )
    }
}

/// Type alias for orchestrator results.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
