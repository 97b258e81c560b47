//! Record header codec
//!
//! The 16-byte physical descriptor of one record's storage.

use bytes::{Buf, BufMut};

use crate::error::{Result, StoreError};

/// Encoded size of a record header
pub const RECORD_HEADER_LEN: usize = 16;

/// Offset of `data_count` within an encoded header
pub(crate) const DATA_COUNT_FIELD_OFFSET: usize = 12;

/// Physical descriptor of one record
///
/// `index_position` is transient: it is never encoded and is recomputed
/// from slot order when the index is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Byte offset of the first payload byte
    pub data_pointer: u64,
    /// Bytes reserved at `data_pointer` (always >= 1)
    pub data_capacity: u32,
    /// Bytes of payload actually stored (<= capacity)
    pub data_count: u32,
    /// Slot number within the index
    pub index_position: u32,
}

impl RecordHeader {
    /// A fresh, empty header over `[data_pointer, data_pointer + data_capacity)`
    pub fn new(data_pointer: u64, data_capacity: u32) -> Result<Self> {
        if data_capacity < 1 {
            return Err(StoreError::InvalidSize(format!(
                "Bad record capacity: {}",
                data_capacity
            )));
        }
        Ok(Self {
            data_pointer,
            data_capacity,
            data_count: 0,
            index_position: 0,
        })
    }

    /// One past the last reserved byte
    pub fn end(&self) -> u64 {
        self.data_pointer + self.data_capacity as u64
    }

    /// `end`, or `None` if the block runs past `u64::MAX`.
    ///
    /// Headers read from disk must pass through this before `end` is used.
    pub fn checked_end(&self) -> Option<u64> {
        self.data_pointer.checked_add(self.data_capacity as u64)
    }

    /// Reserved but unused bytes
    pub fn free_space(&self) -> u32 {
        self.data_capacity - self.data_count
    }

    /// Encode as pointer (8) | capacity (4) | count (4), big-endian.
    ///
    /// Callers must hand the whole array to a single write call; a torn
    /// header cannot be recovered.
    pub fn encode(&self) -> [u8; RECORD_HEADER_LEN] {
        let mut out = [0u8; RECORD_HEADER_LEN];
        let mut buf = &mut out[..];
        buf.put_u64(self.data_pointer);
        buf.put_u32(self.data_capacity);
        buf.put_u32(self.data_count);
        out
    }

    /// Decode from the first 16 bytes of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_HEADER_LEN {
            return Err(StoreError::Format(format!(
                "Incomplete record header: expected {} bytes, got {}",
                RECORD_HEADER_LEN,
                bytes.len()
            )));
        }
        let mut buf = &bytes[..RECORD_HEADER_LEN];
        Ok(Self {
            data_pointer: buf.get_u64(),
            data_capacity: buf.get_u32(),
            data_count: buf.get_u32(),
            index_position: 0,
        })
    }

    /// Carve this block into an exact-fit piece of `used_bytes` and a
    /// remainder starting right after it. Only descriptors change.
    pub fn split(self, used_bytes: u32) -> Result<(RecordHeader, RecordHeader)> {
        if used_bytes < 1 {
            return Err(StoreError::InvalidSize(format!(
                "Cannot split at {} bytes",
                used_bytes
            )));
        }
        if used_bytes >= self.data_capacity {
            return Err(StoreError::InvalidSize(format!(
                "Cannot split {} bytes off a block of capacity {}",
                used_bytes, self.data_capacity
            )));
        }

        let remainder = RecordHeader::new(
            self.data_pointer + used_bytes as u64,
            self.data_capacity - used_bytes,
        )?;
        let shrunk = RecordHeader {
            data_capacity: used_bytes,
            data_count: self.data_count.min(used_bytes),
            ..self
        };
        Ok((shrunk, remainder))
    }
}
