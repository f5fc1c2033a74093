// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Claim-check error types.

use thiserror::Error;

/// Errors that can occur during claim-check operations.
///
/// Each error is fatal for the single offload or retrieve call that raised
/// it. The field sweeps isolate failures per field instead of propagating
/// them.
#[derive(Debug, Error)]
pub enum ClaimCheckError {
    /// Configuration error (missing or invalid setting).
    #[error("configuration error: {0}")]
    Config(String),

    /// Compressing a payload before upload failed.
    #[error("compression failed: {0}")]
    Compression(String),

    /// Decompressing a retrieved payload failed.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Storing a payload in the object store failed.
    #[error("object store put failed: {0}")]
    Upload(String),

    /// Fetching a payload from the object store failed.
    #[error("object store get failed: {0}")]
    Download(String),

    /// Object store health check failed.
    #[error("object store unhealthy: {0}")]
    Unhealthy(String),

    /// Input was neither a raw payload nor a claim-check reference.
    #[error("input is neither a payload nor a claim-check reference")]
    UnrecognizedInput,

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Type alias for claim-check results.
pub type Result<T> = std::result::Result<T, ClaimCheckError>;
