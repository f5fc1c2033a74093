// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Payload compression for stored objects.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{ClaimCheckError, Result};

/// Compression applied to payloads before they reach the object store.
pub trait Compressor: Send + Sync {
    /// Compress a payload.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a stored payload.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Gzip compression via flate2.
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    /// Gzip at the default compression level.
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// Gzip at an explicit level (0 = none, 9 = maximum).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for GzipCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .map_err(|e| ClaimCheckError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| ClaimCheckError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| ClaimCheckError::Decompression(e.to_string()))?;
        Ok(out)
    }
}

/// Pass-through compressor used when compression is disabled.
pub struct NoopCompressor;

impl Compressor for NoopCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_round_trip() {
        let compressor = GzipCompressor::new();
        let payload = b"abcabcabcabcabcabcabcabcabcabc".repeat(100);
        let compressed = compressor.compress(&payload).unwrap();
        assert!(compressed.len() < payload.len());
        assert_eq!(compressor.decompress(&compressed).unwrap(), payload);
    }

    #[test]
    fn test_gzip_empty_payload() {
        let compressor = GzipCompressor::new();
        let compressed = compressor.compress(b"").unwrap();
        assert_eq!(compressor.decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_gzip_rejects_garbage() {
        let compressor = GzipCompressor::new();
        let err = compressor.decompress(b"not gzip data").unwrap_err();
        assert!(matches!(err, ClaimCheckError::Decompression(_)));
    }

    #[test]
    fn test_noop_round_trip() {
        let compressor = NoopCompressor;
        let payload = b"raw bytes".to_vec();
        assert_eq!(compressor.compress(&payload).unwrap(), payload);
        assert_eq!(compressor.decompress(&payload).unwrap(), payload);
    }
}
