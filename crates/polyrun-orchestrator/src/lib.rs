// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Durable orchestration of polyglot executions.
//!
//! One execution is driven by a replay-safe workflow run on an external
//! durable engine, while its task handlers may live in a different runtime
//! on a separate worker pool. This crate provides the three pieces that
//! make that split work:
//!
//! ```text
//! ┌──────────────────────────────┐    remote dispatch     ┌─────────────────────┐
//! │  ExecutionDriver             │───(activity queue)────►│  Task handlers      │
//! │  (orchestration queue)       │                        │  (other runtime)    │
//! │                              │                        └──────────┬──────────┘
//! │  failure → local dispatch    │                                   │ progressive
//! │            │                 │                                   │ status updates
//! │            ▼                 │                                   ▼
//! │  ┌────────────────────┐      │                        ┌─────────────────────┐
//! │  │   StatusMerger     │◄─────┼────────────────────────│  update_execution_  │
//! │  └─────────┬──────────┘      │   (same merge engine)  │  status entry point │
//! └────────────┼─────────────────┘                        └─────────────────────┘
//!              ▼
//!       resource store
//! ```
//!
//! # Who owns which transition
//!
//! The task handler pushes progressive [`polyrun_types::StatusUpdate`]s
//! through the merge engine as the authoritative status channel; the
//! driver's own return value is informational only. The single exception is
//! an orchestration-level failure (dispatch error, contract violation, run
//! timeout): the driver then forces a terminal `FAILED` phase through an
//! **in-process** merge call, because the remote worker may itself be the
//! failure source and must not be a dependency of the recovery path.
//!
//! # Queue routing
//!
//! The driver is scheduled on a fixed orchestration queue. The activity
//! queue is read once from the run's immutable memo — set at schedule time
//! from [`dispatch::RunDispatchConfig`] — and never recomputed during the
//! run, so replay always routes identically. Handlers are addressed by the
//! case-sensitive string names in [`polyrun_types::contract`]; nothing
//! checks those names across runtimes at compile time, which is why each
//! registered name is pinned by an integration test.

mod driver;
mod error;
mod status;
mod worker;

pub mod dispatch;
pub mod store;

pub use driver::{DriverOptions, ExecutionDriver};
pub use error::{OrchestratorError, Result};
pub use status::StatusMerger;
pub use worker::OrchestrationWorker;
