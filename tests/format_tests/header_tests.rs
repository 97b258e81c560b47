//! Tests for the on-disk codecs
//!
//! These tests verify:
//! - RecordHeader encode/decode and its fixed 16-byte layout
//! - Split into exact-fit piece + remainder
//! - StoreHeader layout
//! - Key slot encoding limits

use recordkv::format::{
    decode_key, encode_key, RecordHeader, StoreHeader, KEY_SLOT_LEN, MAX_KEY_LEN,
    RECORD_HEADER_LEN, STORE_HEADER_LEN,
};
use recordkv::StoreError;

// =============================================================================
// Helper Functions
// =============================================================================

fn header(pointer: u64, capacity: u32, count: u32) -> RecordHeader {
    let mut header = RecordHeader::new(pointer, capacity).unwrap();
    header.data_count = count;
    header
}

// =============================================================================
// RecordHeader Tests
// =============================================================================

#[test]
fn test_header_new_rejects_zero_capacity() {
    let result = RecordHeader::new(100, 0);

    assert!(matches!(result, Err(StoreError::InvalidSize(_))));
}

#[test]
fn test_header_new_starts_empty() {
    let header = RecordHeader::new(100, 10).unwrap();

    assert_eq!(header.data_count, 0);
    assert_eq!(header.free_space(), 10);
    assert_eq!(header.end(), 110);
}

#[test]
fn test_header_encodes_to_sixteen_bytes() {
    let encoded = header(1, 2, 1).encode();

    assert_eq!(encoded.len(), RECORD_HEADER_LEN);
    assert_eq!(&encoded[..8], &1u64.to_be_bytes());
    assert_eq!(&encoded[8..12], &2u32.to_be_bytes());
    assert_eq!(&encoded[12..], &1u32.to_be_bytes());
}

#[test]
fn test_header_decode_matches_encode() {
    let original = header(u64::MAX - 5, u32::MAX, 17);

    let decoded = RecordHeader::decode(&original.encode()).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn test_header_decode_ignores_trailing_bytes() {
    let mut bytes = header(40, 8, 8).encode().to_vec();
    bytes.extend_from_slice(&[0xFF; 10]);

    let decoded = RecordHeader::decode(&bytes).unwrap();

    assert_eq!(decoded.data_pointer, 40);
    assert_eq!(decoded.data_capacity, 8);
}

#[test]
fn test_header_decode_too_short() {
    let bytes = header(40, 8, 8).encode();

    let result = RecordHeader::decode(&bytes[..15]);

    assert!(matches!(result, Err(StoreError::Format(_))));
}

// =============================================================================
// Split Tests
// =============================================================================

#[test]
fn test_split_carves_exact_fit_and_remainder() {
    let block = header(1000, 100, 30);

    let (shrunk, remainder) = block.split(30).unwrap();

    assert_eq!(shrunk.data_pointer, 1000);
    assert_eq!(shrunk.data_capacity, 30);
    assert_eq!(shrunk.data_count, 30);
    assert_eq!(remainder.data_pointer, 1030);
    assert_eq!(remainder.data_capacity, 70);
    assert_eq!(remainder.data_count, 0);
    assert_eq!(shrunk.end(), remainder.data_pointer);
    assert_eq!(remainder.end(), block.end());
}

#[test]
fn test_split_rejects_zero() {
    let result = header(0, 10, 0).split(0);

    assert!(matches!(result, Err(StoreError::InvalidSize(_))));
}

#[test]
fn test_split_rejects_whole_block() {
    let result = header(0, 10, 10).split(10);

    assert!(matches!(result, Err(StoreError::InvalidSize(_))));
}

// =============================================================================
// StoreHeader Tests
// =============================================================================

#[test]
fn test_store_header_layout() {
    let store_header = StoreHeader {
        record_count: 3,
        data_start: 248,
    };

    let encoded = store_header.encode();

    assert_eq!(encoded.len(), STORE_HEADER_LEN);
    assert_eq!(encoded, [0, 0, 0, 3, 0, 0, 0, 248]);
    assert_eq!(StoreHeader::decode(&encoded).unwrap(), store_header);
}

#[test]
fn test_store_header_decode_too_short() {
    let result = StoreHeader::decode(&[0, 0, 0, 1]);

    assert!(matches!(result, Err(StoreError::Format(_))));
}

// =============================================================================
// Key Slot Tests
// =============================================================================

#[test]
fn test_key_slot_is_length_prefixed_utf8() {
    let slot = encode_key("héllo").unwrap();

    assert_eq!(slot.len(), KEY_SLOT_LEN);
    assert_eq!(&slot[..2], &6u16.to_be_bytes());
    assert_eq!(&slot[2..8], "héllo".as_bytes());
    assert!(slot[8..].iter().all(|&b| b == 0));
    assert_eq!(decode_key(&slot).unwrap(), "héllo");
}

#[test]
fn test_key_slot_accepts_max_length() {
    let key = "k".repeat(MAX_KEY_LEN);

    let slot = encode_key(&key).unwrap();

    assert_eq!(decode_key(&slot).unwrap(), key);
}

#[test]
fn test_key_slot_rejects_long_key() {
    let key = "k".repeat(MAX_KEY_LEN + 1);

    let result = encode_key(&key);

    assert!(matches!(result, Err(StoreError::InvalidKey(_))));
}

#[test]
fn test_key_slot_decode_rejects_bad_length() {
    let mut slot = [0u8; KEY_SLOT_LEN];
    slot[..2].copy_from_slice(&(MAX_KEY_LEN as u16 + 1).to_be_bytes());

    let result = decode_key(&slot);

    assert!(matches!(result, Err(StoreError::Format(_))));
}

#[test]
fn test_key_slot_decode_rejects_invalid_utf8() {
    let mut slot = [0u8; KEY_SLOT_LEN];
    slot[..2].copy_from_slice(&2u16.to_be_bytes());
    slot[2] = 0xC3;
    slot[3] = 0x28;

    let result = decode_key(&slot);

    assert!(matches!(result, Err(StoreError::Format(_))));
}
