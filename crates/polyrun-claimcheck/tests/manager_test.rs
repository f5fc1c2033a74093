// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Integration tests for claim-check offload and retrieval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use polyrun_claimcheck::{
    ClaimCheckConfig, ClaimCheckError, ClaimCheckManager, ClaimCheckReference, MemoryStore,
    ObjectStore, OffloadOutcome,
};

const ONE_MIB: u64 = 1024 * 1024;

/// Store wrapper that can be switched into failure mode per operation.
struct FlakyStore {
    inner: MemoryStore,
    fail_puts: AtomicBool,
    fail_gets: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_puts: AtomicBool::new(false),
            fail_gets: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put(&self, data: &[u8]) -> polyrun_claimcheck::Result<String> {
        if self.fail_puts.load(Ordering::Relaxed) {
            return Err(ClaimCheckError::Upload("simulated outage".to_string()));
        }
        self.inner.put(data).await
    }

    async fn get(&self, key: &str) -> polyrun_claimcheck::Result<Vec<u8>> {
        if self.fail_gets.load(Ordering::Relaxed) {
            return Err(ClaimCheckError::Download("simulated outage".to_string()));
        }
        self.inner.get(key).await
    }

    async fn health(&self) -> polyrun_claimcheck::Result<()> {
        Ok(())
    }
}

fn manager_with_store(threshold: u64, compression: bool) -> (ClaimCheckManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = ClaimCheckConfig::default()
        .with_threshold_bytes(threshold)
        .with_compression_enabled(compression);
    (ClaimCheckManager::new(config, store.clone()), store)
}

#[tokio::test]
async fn test_small_payload_passes_through_without_store_io() {
    let (manager, store) = manager_with_store(1024, true);

    let payload = b"small payload".to_vec();
    let outcome = manager.offload(payload.clone()).await.unwrap();

    assert_eq!(outcome, OffloadOutcome::Inline(payload));
    assert_eq!(store.put_count(), 0);
    assert_eq!(manager.metrics().offload_count, 0);
}

#[tokio::test]
async fn test_round_trip_with_compression() {
    let (manager, store) = manager_with_store(64, true);

    let payload = b"compressible payload ".repeat(100);
    let outcome = manager.offload(payload.clone()).await.unwrap();

    let OffloadOutcome::Offloaded(reference) = outcome else {
        panic!("payload above threshold should be offloaded");
    };
    assert_eq!(reference.size_bytes, payload.len() as i64);
    assert!(reference.compressed);
    assert_eq!(store.put_count(), 1);

    let restored = manager.retrieve(&reference).await.unwrap();
    assert_eq!(restored, payload);
}

#[tokio::test]
async fn test_round_trip_without_compression() {
    let (manager, _store) = manager_with_store(64, false);

    let payload = vec![0xABu8; 512];
    let outcome = manager.offload(payload.clone()).await.unwrap();

    let OffloadOutcome::Offloaded(reference) = outcome else {
        panic!("payload above threshold should be offloaded");
    };
    assert!(!reference.compressed);

    let restored = manager.retrieve(&reference).await.unwrap();
    assert_eq!(restored, payload);
}

#[tokio::test]
async fn test_metrics_count_offloads_and_retrievals() {
    let (manager, _store) = manager_with_store(16, true);

    let payload = b"payload well above the tiny threshold".to_vec();
    let OffloadOutcome::Offloaded(reference) = manager.offload(payload.clone()).await.unwrap()
    else {
        panic!("expected offload");
    };
    manager.retrieve(&reference).await.unwrap();

    let metrics = manager.metrics();
    assert_eq!(metrics.offload_count, 1);
    assert_eq!(metrics.retrieval_count, 1);
    assert_eq!(metrics.bytes_stored, payload.len() as u64);
}

#[tokio::test]
async fn test_retrieve_value_rejects_unrecognized_input() {
    let (manager, _store) = manager_with_store(1024, true);

    let err = manager.retrieve_value(&json!(42)).await.unwrap_err();
    assert!(matches!(err, ClaimCheckError::UnrecognizedInput));

    let err = manager
        .retrieve_value(&json!({"some": "object"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClaimCheckError::UnrecognizedInput));
}

#[tokio::test]
async fn test_retrieve_value_passes_raw_payload_through() {
    let (manager, store) = manager_with_store(1024, true);

    let bytes = manager
        .retrieve_value(&json!("inline payload"))
        .await
        .unwrap();
    assert_eq!(bytes, b"inline payload");
    assert_eq!(store.get_count(), 0);
}

#[tokio::test]
async fn test_field_sweep_offloads_only_oversized_fields() {
    let (manager, store) = manager_with_store(ONE_MIB, true);

    let blob = "x".repeat(2 * ONE_MIB as usize);
    let mut document = Map::new();
    document.insert("a".to_string(), json!("tiny"));
    document.insert("b".to_string(), Value::String(blob.clone()));

    let offloaded = manager.offload_fields(document).await;

    assert_eq!(offloaded["a"], json!("tiny"));
    assert!(ClaimCheckReference::is_reference(&offloaded["b"]));
    assert_eq!(store.put_count(), 1);

    let restored = manager.retrieve_fields(offloaded).await;
    assert_eq!(restored["a"], json!("tiny"));
    assert_eq!(restored["b"], Value::String(blob));
}

#[tokio::test]
async fn test_field_sweep_passes_nulls_and_references_through() {
    let (manager, store) = manager_with_store(ONE_MIB, true);

    let existing_reference = json!({"key": "prior-key", "size_bytes": 4096, "compressed": true});
    let mut document = Map::new();
    document.insert("empty".to_string(), Value::Null);
    document.insert("prior".to_string(), existing_reference.clone());

    let result = manager.offload_fields(document).await;

    assert_eq!(result["empty"], Value::Null);
    assert_eq!(result["prior"], existing_reference);
    assert_eq!(store.put_count(), 0);
}

#[tokio::test]
async fn test_field_sweep_isolates_retrieval_failures() {
    let store = Arc::new(FlakyStore::new());
    let config = ClaimCheckConfig::default().with_threshold_bytes(ONE_MIB);
    let manager = ClaimCheckManager::new(config, store.clone());

    let blob = "y".repeat(2 * ONE_MIB as usize);
    let mut document = Map::new();
    document.insert("a".to_string(), json!("tiny"));
    document.insert("b".to_string(), Value::String(blob));

    let offloaded = manager.offload_fields(document).await;
    let reference_value = offloaded["b"].clone();
    assert!(ClaimCheckReference::is_reference(&reference_value));

    // Simulate a store outage for the retrieval sweep.
    store.fail_gets.store(true, Ordering::Relaxed);
    let restored = manager.retrieve_fields(offloaded).await;

    // Healthy field processed, broken field keeps its reference.
    assert_eq!(restored["a"], json!("tiny"));
    assert_eq!(restored["b"], reference_value);
}

#[tokio::test]
async fn test_field_sweep_isolates_offload_failures() {
    let store = Arc::new(FlakyStore::new());
    let config = ClaimCheckConfig::default().with_threshold_bytes(ONE_MIB);
    let manager = ClaimCheckManager::new(config, store.clone());

    store.fail_puts.store(true, Ordering::Relaxed);

    let blob = "z".repeat(2 * ONE_MIB as usize);
    let mut document = Map::new();
    document.insert("a".to_string(), json!("tiny"));
    document.insert("b".to_string(), Value::String(blob.clone()));

    let result = manager.offload_fields(document).await;

    // The failed field keeps its original value instead of aborting the sweep.
    assert_eq!(result["a"], json!("tiny"));
    assert_eq!(result["b"], Value::String(blob));
}

#[tokio::test]
async fn test_field_sweep_restores_structured_fields() {
    let (manager, _store) = manager_with_store(256, true);

    let rows: Vec<Value> = (0..100)
        .map(|i| json!({"row": i, "payload": "some repeated content"}))
        .collect();
    let structured = Value::Array(rows);

    let mut document = Map::new();
    document.insert("report".to_string(), structured.clone());

    let offloaded = manager.offload_fields(document).await;
    assert!(ClaimCheckReference::is_reference(&offloaded["report"]));

    let restored = manager.retrieve_fields(offloaded).await;
    assert_eq!(restored["report"], structured);
}
