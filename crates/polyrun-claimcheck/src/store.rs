// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Object store adapter and backends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ClaimCheckError, Result};

/// Key-addressed blob storage for offloaded payloads.
///
/// The production blob service lives behind this trait; the crate ships a
/// filesystem backend and an in-memory backend for tests and embedded use.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a payload and return the key it was stored under.
    async fn put(&self, data: &[u8]) -> Result<String>;

    /// Fetch a payload by key.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Check that the store is reachable and writable.
    async fn health(&self) -> Result<()>;
}

/// Object store backed by a local directory, one file per key.
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Create a store rooted at `base_path`, creating the directory if
    /// missing.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        if base_path.as_os_str().is_empty() {
            return Err(ClaimCheckError::Config("base path is required".to_string()));
        }
        std::fs::create_dir_all(&base_path).map_err(|e| {
            ClaimCheckError::Config(format!(
                "failed to create store directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(Self { base_path })
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn put(&self, data: &[u8]) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        let path = self.base_path.join(&key);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ClaimCheckError::Upload(format!("filesystem put failed: {}", e)))?;
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.base_path.join(key);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ClaimCheckError::Download(format!("filesystem get failed: {}", e)))
    }

    async fn health(&self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.base_path)
            .await
            .map_err(|e| ClaimCheckError::Unhealthy(format!("store directory missing: {}", e)))?;
        if !metadata.is_dir() {
            return Err(ClaimCheckError::Unhealthy(format!(
                "'{}' is not a directory",
                self.base_path.display()
            )));
        }
        Ok(())
    }
}

/// In-memory object store that counts calls, for tests and embedded use.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    put_count: AtomicU64,
    get_count: AtomicU64,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `put` was called.
    pub fn put_count(&self) -> u64 {
        self.put_count.load(Ordering::Relaxed)
    }

    /// How many times `get` was called.
    pub fn get_count(&self) -> u64 {
        self.get_count.load(Ordering::Relaxed)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.lock().expect("store mutex poisoned").len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, data: &[u8]) -> Result<String> {
        self.put_count.fetch_add(1, Ordering::Relaxed);
        let key = Uuid::new_v4().to_string();
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .insert(key.clone(), data.to_vec());
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.get_count.fetch_add(1, Ordering::Relaxed);
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| ClaimCheckError::Download(format!("key '{}' not found", key)))
    }

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}
