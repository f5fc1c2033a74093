// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Claim-check operation counters.
//!
//! Offload and retrieve run concurrently from many out-of-band callers, so
//! all accumulation is atomic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Thread-safe counters mutated by concurrent offload/retrieve calls.
#[derive(Debug, Default)]
pub(crate) struct ClaimCheckMetrics {
    offload_count: AtomicU64,
    retrieval_count: AtomicU64,
    bytes_stored: AtomicU64,
    upload_ms_total: AtomicU64,
    download_ms_total: AtomicU64,
}

impl ClaimCheckMetrics {
    pub(crate) fn record_offload(&self, original_bytes: u64, latency: Duration) {
        self.offload_count.fetch_add(1, Ordering::Relaxed);
        self.bytes_stored.fetch_add(original_bytes, Ordering::Relaxed);
        self.upload_ms_total
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_retrieval(&self, latency: Duration) {
        self.retrieval_count.fetch_add(1, Ordering::Relaxed);
        self.download_ms_total
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            offload_count: self.offload_count.load(Ordering::Relaxed),
            retrieval_count: self.retrieval_count.load(Ordering::Relaxed),
            bytes_stored: self.bytes_stored.load(Ordering::Relaxed),
            upload_ms_total: self.upload_ms_total.load(Ordering::Relaxed),
            download_ms_total: self.download_ms_total.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the claim-check counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Payloads offloaded to the object store.
    pub offload_count: u64,
    /// Payloads retrieved from the object store.
    pub retrieval_count: u64,
    /// Total original (uncompressed) bytes offloaded.
    pub bytes_stored: u64,
    /// Cumulative upload latency in milliseconds.
    pub upload_ms_total: u64,
    /// Cumulative download latency in milliseconds.
    pub download_ms_total: u64,
}
