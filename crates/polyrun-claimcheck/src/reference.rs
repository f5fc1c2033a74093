// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The claim-check reference — the small stand-in for an offloaded payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a payload stored out-of-band in the object store.
///
/// Immutable once created. References travel through execution documents in
/// place of the payload they replaced, and are recognized on read by
/// structural shape matching alone: an object with exactly the fields
/// `key` (string), `size_bytes` (integer) and `compressed` (bool). A
/// legitimate payload that happens to carry exactly that shape is
/// indistinguishable from a reference and will be misidentified by
/// retrieval — there is no type tag on the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimCheckReference {
    /// Opaque object-store key the payload was stored under.
    pub key: String,
    /// Original, uncompressed payload size.
    pub size_bytes: i64,
    /// Whether the stored bytes are gzip-compressed.
    pub compressed: bool,
}

impl ClaimCheckReference {
    /// Create a reference to a stored payload.
    pub fn new(key: impl Into<String>, size_bytes: i64, compressed: bool) -> Self {
        Self {
            key: key.into(),
            size_bytes,
            compressed,
        }
    }

    /// Parse a JSON value into a reference if it is reference-shaped.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether a JSON value is reference-shaped.
    pub fn is_reference(value: &Value) -> bool {
        Self::from_value(value).is_some()
    }

    /// Serialize this reference into a JSON value for embedding in a
    /// document field.
    pub fn to_value(&self) -> Value {
        // Serializing a struct of plain scalars cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
