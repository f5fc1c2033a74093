// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource store adapter.
//!
//! The production key-value resource store is an external collaborator;
//! this module defines the seam the merge engine writes through, plus an
//! in-memory backend for tests and embedded use.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{OrchestratorError, Result};

/// Resource kind under which execution records are stored.
pub const EXECUTION_KIND: &str = "Execution";

/// Key-value store of typed resource records.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Load a record by kind and id. `Ok(None)` when the record does not
    /// exist.
    async fn get_resource(&self, kind: &str, id: &str) -> Result<Option<Value>>;

    /// Save a record under kind and id, overwriting any prior record.
    async fn save_resource(&self, kind: &str, id: &str, record: &Value) -> Result<()>;
}

/// In-memory resource store.
///
/// Individual get/save calls are serialized; read-modify-write cycles are
/// not, matching the external store's single-writer-per-record contract.
#[derive(Default)]
pub struct MemoryResourceStore {
    records: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn get_resource(&self, kind: &str, id: &str) -> Result<Option<Value>> {
        let records = self.records.read().map_err(|e| OrchestratorError::Storage {
            operation: "get".to_string(),
            details: e.to_string(),
        })?;
        Ok(records.get(&(kind.to_string(), id.to_string())).cloned())
    }

    async fn save_resource(&self, kind: &str, id: &str, record: &Value) -> Result<()> {
        let mut records = self.records.write().map_err(|e| OrchestratorError::Storage {
            operation: "save".to_string(),
            details: e.to_string(),
        })?;
        records.insert((kind.to_string(), id.to_string()), record.clone());
        Ok(())
    }
}
