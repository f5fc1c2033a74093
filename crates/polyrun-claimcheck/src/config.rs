// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Claim-check configuration.

use std::env;

/// Configuration for the claim-check manager.
#[derive(Debug, Clone)]
pub struct ClaimCheckConfig {
    /// Payloads at or above this size are offloaded (default: 51_200).
    pub threshold_bytes: u64,
    /// Gzip payloads before storing them (default: true).
    pub compression_enabled: bool,
}

impl ClaimCheckConfig {
    /// Load configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `POLYRUN_CLAIMCHECK_THRESHOLD_BYTES` - Offload threshold (default: 51200)
    /// - `POLYRUN_CLAIMCHECK_COMPRESSION_ENABLED` - Gzip stored payloads (default: true)
    pub fn from_env() -> Self {
        let threshold_bytes = env::var("POLYRUN_CLAIMCHECK_THRESHOLD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(51_200);

        let compression_enabled = env::var("POLYRUN_CLAIMCHECK_COMPRESSION_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            threshold_bytes,
            compression_enabled,
        }
    }

    /// Set the offload threshold.
    pub fn with_threshold_bytes(mut self, threshold_bytes: u64) -> Self {
        self.threshold_bytes = threshold_bytes;
        self
    }

    /// Enable or disable compression of stored payloads.
    pub fn with_compression_enabled(mut self, enabled: bool) -> Self {
        self.compression_enabled = enabled;
        self
    }
}

impl Default for ClaimCheckConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: 51_200,
            compression_enabled: true,
        }
    }
}
