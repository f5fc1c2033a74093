// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Claim-check offloading of oversized execution payloads.
//!
//! Durable orchestration keeps every dispatched payload in the engine's
//! history, so oversized step inputs and outputs bloat the data plane for
//! the lifetime of the run. This crate replaces any payload at or above a
//! configured size threshold with a small [`ClaimCheckReference`], storing
//! the real bytes in an object store and rehydrating them on read.
//!
//! Offloading works at two granularities:
//!
//! - **Whole payload**: [`ClaimCheckManager::offload`] /
//!   [`ClaimCheckManager::retrieve`] on raw bytes.
//! - **Field by field**: [`ClaimCheckManager::offload_fields`] /
//!   [`ClaimCheckManager::retrieve_fields`] sweep one level of a JSON
//!   document, so claim-check can run *between* steps of a multi-step
//!   execution rather than only at its boundaries. Per-field failures are
//!   logged and leave the field untouched — a single failed storage write
//!   must not make a whole multi-field record unusable.
//!
//! Store and compression I/O is non-deterministic and therefore must never
//! run inline in replay-sensitive orchestration logic: callers dispatch the
//! manager's operations as activities and await the result.
//!
//! # Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `POLYRUN_CLAIMCHECK_THRESHOLD_BYTES` | `51200` | Offload payloads at or above this size |
//! | `POLYRUN_CLAIMCHECK_COMPRESSION_ENABLED` | `true` | Gzip payloads before storing |

mod compress;
mod config;
mod error;
mod manager;
mod metrics;
mod reference;
mod registry;
mod store;

pub use compress::{Compressor, GzipCompressor, NoopCompressor};
pub use config::ClaimCheckConfig;
pub use error::{ClaimCheckError, Result};
pub use manager::{ClaimCheckManager, OffloadOutcome};
pub use metrics::MetricsSnapshot;
pub use reference::ClaimCheckReference;
pub use registry::{manager, register_manager, try_manager};
pub use store::{FilesystemStore, MemoryStore, ObjectStore};
