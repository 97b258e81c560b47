//! Store header codec
//!
//! File-level metadata at offset 0.

use bytes::{Buf, BufMut};

use crate::error::{Result, StoreError};

/// Encoded size of the store header
pub const STORE_HEADER_LEN: usize = 8;

/// Offset of the record count; a 4-byte write here is the commit point of
/// inserts and deletes
pub const RECORD_COUNT_OFFSET: u64 = 0;

/// Offset of the data region start pointer
pub const DATA_START_OFFSET: u64 = 4;

/// File-level metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreHeader {
    /// Number of committed records (= live index slots)
    pub record_count: u32,
    /// Boundary between the index region and the data region
    pub data_start: u32,
}

impl StoreHeader {
    pub fn encode(&self) -> [u8; STORE_HEADER_LEN] {
        let mut out = [0u8; STORE_HEADER_LEN];
        let mut buf = &mut out[..];
        buf.put_u32(self.record_count);
        buf.put_u32(self.data_start);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < STORE_HEADER_LEN {
            return Err(StoreError::Format(format!(
                "Incomplete store header: expected {} bytes, got {}",
                STORE_HEADER_LEN,
                bytes.len()
            )));
        }
        let mut buf = &bytes[..STORE_HEADER_LEN];
        Ok(Self {
            record_count: buf.get_u32(),
            data_start: buf.get_u32(),
        })
    }
}
