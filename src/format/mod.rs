//! Format Module
//!
//! Bit-exact on-disk layout of a record store file.
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ StoreHeader (8)                                │
//! │ ┌──────────────────┬──────────────────────────┐│
//! │ │ Record Count (4) │ Data Start Pointer (4)   ││
//! │ └──────────────────┴──────────────────────────┘│
//! ├────────────────────────────────────────────────┤
//! │ Index Region (slot p at 8 + p * 80)            │
//! │ ┌───────────────────────┬─────────────────────┐│
//! │ │ Key Slot (64)         │ RecordHeader (16)   ││
//! │ │ len(2) + UTF-8 + pad  │ ptr(8) cap(4) cnt(4)││
//! │ └───────────────────────┴─────────────────────┘│
//! │ ... (record_count live slots, then spare)     │
//! ├────────────────────────────────────────────────┤
//! │ Data Region (from data start to end of file)   │
//! │ capacity bytes reserved at each data pointer,  │
//! │ of which the first count bytes are payload     │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! All integers are big-endian.

mod header;
mod key;
mod store_header;

pub use header::{RecordHeader, RECORD_HEADER_LEN};
pub use key::{decode_key, encode_key, validate_key, KEY_SLOT_LEN, MAX_KEY_LEN};
pub use store_header::{StoreHeader, DATA_START_OFFSET, RECORD_COUNT_OFFSET, STORE_HEADER_LEN};

use crate::error::{Result, StoreError};

/// Size of one index slot: key slot followed by the record header
pub const INDEX_ENTRY_LEN: usize = KEY_SLOT_LEN + RECORD_HEADER_LEN;

/// File offset of index slot `position`
pub fn slot_offset(position: u32) -> u64 {
    STORE_HEADER_LEN as u64 + position as u64 * INDEX_ENTRY_LEN as u64
}

/// File offset of the record header inside index slot `position`
pub fn header_offset(position: u32) -> u64 {
    slot_offset(position) + KEY_SLOT_LEN as u64
}

/// File offset of the `data_count` field inside index slot `position`
pub fn data_count_offset(position: u32) -> u64 {
    header_offset(position) + header::DATA_COUNT_FIELD_OFFSET as u64
}

/// Smallest data start that leaves room for `slots` index slots
pub fn index_region_end(slots: u32) -> u64 {
    slot_offset(slots)
}

/// Encode a whole index slot so it can be issued as one write
pub fn encode_entry(key: &str, header: &RecordHeader) -> Result<[u8; INDEX_ENTRY_LEN]> {
    let mut entry = [0u8; INDEX_ENTRY_LEN];
    entry[..KEY_SLOT_LEN].copy_from_slice(&encode_key(key)?);
    entry[KEY_SLOT_LEN..].copy_from_slice(&header.encode());
    Ok(entry)
}

/// Decode a whole index slot
pub fn decode_entry(bytes: &[u8]) -> Result<(String, RecordHeader)> {
    if bytes.len() < INDEX_ENTRY_LEN {
        return Err(StoreError::Format(format!(
            "Incomplete index entry: expected {} bytes, got {}",
            INDEX_ENTRY_LEN,
            bytes.len()
        )));
    }
    let key = decode_key(&bytes[..KEY_SLOT_LEN])?;
    let header = RecordHeader::decode(&bytes[KEY_SLOT_LEN..INDEX_ENTRY_LEN])?;
    Ok((key, header))
}
