// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Claim-check manager: threshold-driven offload and retrieval.

use std::sync::Arc;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::compress::{Compressor, GzipCompressor, NoopCompressor};
use crate::config::ClaimCheckConfig;
use crate::error::Result;
use crate::metrics::{ClaimCheckMetrics, MetricsSnapshot};
use crate::reference::ClaimCheckReference;
use crate::store::ObjectStore;

/// Result of an offload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffloadOutcome {
    /// Payload was below the threshold and is returned unchanged.
    Inline(Vec<u8>),
    /// Payload was stored out-of-band; this reference stands in for it.
    Offloaded(ClaimCheckReference),
}

/// Orchestrates claim-check operations against one object store.
///
/// All methods perform real store I/O and must be dispatched out-of-band
/// (as activities) by replay-sensitive callers. Metrics accumulation is
/// atomic, so one manager can serve many concurrent callers.
pub struct ClaimCheckManager {
    store: Arc<dyn ObjectStore>,
    compressor: Box<dyn Compressor>,
    threshold_bytes: u64,
    compression_enabled: bool,
    metrics: ClaimCheckMetrics,
}

impl ClaimCheckManager {
    /// Create a manager over the given object store.
    pub fn new(config: ClaimCheckConfig, store: Arc<dyn ObjectStore>) -> Self {
        let compressor: Box<dyn Compressor> = if config.compression_enabled {
            Box::new(GzipCompressor::new())
        } else {
            Box::new(NoopCompressor)
        };

        Self {
            store,
            compressor,
            threshold_bytes: config.threshold_bytes,
            compression_enabled: config.compression_enabled,
            metrics: ClaimCheckMetrics::default(),
        }
    }

    /// Offload a payload if it is at or above the threshold.
    ///
    /// Below-threshold payloads are returned unchanged with no store I/O.
    pub async fn offload(&self, payload: Vec<u8>) -> Result<OffloadOutcome> {
        let original_size = payload.len() as u64;
        if original_size < self.threshold_bytes {
            return Ok(OffloadOutcome::Inline(payload));
        }

        info!(
            size_bytes = original_size,
            threshold = self.threshold_bytes,
            "Offloading large payload"
        );

        let start = Instant::now();
        let data_to_store = if self.compression_enabled {
            self.compressor.compress(&payload)?
        } else {
            payload
        };

        let key = self.store.put(&data_to_store).await?;
        self.metrics.record_offload(original_size, start.elapsed());

        Ok(OffloadOutcome::Offloaded(ClaimCheckReference::new(
            key,
            original_size as i64,
            self.compression_enabled,
        )))
    }

    /// Fetch the payload a reference stands in for.
    pub async fn retrieve(&self, reference: &ClaimCheckReference) -> Result<Vec<u8>> {
        debug!(
            key = %reference.key,
            size_bytes = reference.size_bytes,
            "Retrieving payload from storage"
        );

        let start = Instant::now();
        let data = self.store.get(&reference.key).await?;
        let payload = if reference.compressed {
            self.compressor.decompress(&data)?
        } else {
            data
        };
        self.metrics.record_retrieval(start.elapsed());

        Ok(payload)
    }

    /// Resolve a JSON value to its payload bytes.
    ///
    /// Reference-shaped values are fetched from the store; string values
    /// are returned as their raw bytes; anything else is unrecognized.
    pub async fn retrieve_value(&self, value: &Value) -> Result<Vec<u8>> {
        if let Some(reference) = ClaimCheckReference::from_value(value) {
            return self.retrieve(&reference).await;
        }
        match value {
            Value::String(payload) => Ok(payload.clone().into_bytes()),
            _ => Err(crate::error::ClaimCheckError::UnrecognizedInput),
        }
    }

    /// Sweep one level of a document and offload oversized fields.
    ///
    /// Nulls and values that are already references pass through untouched.
    /// A field whose serialization or offload fails keeps its original
    /// value; per-field failures never fail the sweep, so one broken
    /// storage write cannot make the whole record unusable.
    pub async fn offload_fields(&self, document: Map<String, Value>) -> Map<String, Value> {
        let mut result = Map::with_capacity(document.len());

        for (field, value) in document {
            if value.is_null() || ClaimCheckReference::is_reference(&value) {
                result.insert(field, value);
                continue;
            }

            let serialized = match serde_json::to_vec(&value) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(field = %field, error = %e, "Skipping field - serialization failed");
                    result.insert(field, value);
                    continue;
                }
            };

            if (serialized.len() as u64) < self.threshold_bytes {
                result.insert(field, value);
                continue;
            }

            match self.offload(serialized).await {
                Ok(OffloadOutcome::Offloaded(reference)) => {
                    info!(
                        field = %field,
                        key = %reference.key,
                        original_size = reference.size_bytes,
                        "Field offloaded to storage"
                    );
                    result.insert(field, reference.to_value());
                }
                Ok(OffloadOutcome::Inline(_)) => {
                    result.insert(field, value);
                }
                Err(e) => {
                    warn!(field = %field, error = %e, "Failed to offload field, keeping original");
                    result.insert(field, value);
                }
            }
        }

        result
    }

    /// Sweep one level of a document and rehydrate reference fields.
    ///
    /// Retrieved bytes are decoded back to JSON where possible; binary
    /// payloads fall back to base64 text. A field whose retrieval fails
    /// keeps its reference in place; per-field failures never fail the
    /// sweep.
    pub async fn retrieve_fields(&self, document: Map<String, Value>) -> Map<String, Value> {
        let mut result = Map::with_capacity(document.len());

        for (field, value) in document {
            let Some(reference) = ClaimCheckReference::from_value(&value) else {
                result.insert(field, value);
                continue;
            };

            match self.retrieve(&reference).await {
                Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                    Ok(decoded) => {
                        result.insert(field, decoded);
                    }
                    Err(e) => {
                        warn!(field = %field, error = %e, "Retrieved data is not JSON, using base64 text");
                        result.insert(field, Value::String(BASE64.encode(&bytes)));
                    }
                },
                Err(e) => {
                    warn!(field = %field, error = %e, "Failed to retrieve field, keeping reference");
                    result.insert(field, value);
                }
            }
        }

        result
    }

    /// Current metrics snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Check the backing object store.
    pub async fn health(&self) -> Result<()> {
        self.store.health().await
    }
}
