//! Key slot codec
//!
//! Keys are stored in a fixed 64-byte slot: a big-endian u16 byte length,
//! the UTF-8 bytes, then zero padding.

use bytes::{Buf, BufMut};

use crate::error::{Result, StoreError};

/// Size of the key slot at the front of each index entry
pub const KEY_SLOT_LEN: usize = 64;

/// Longest key (in UTF-8 bytes) that fits in a key slot
pub const MAX_KEY_LEN: usize = KEY_SLOT_LEN - 2;

/// Reject keys that cannot be stored
pub fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey(format!(
            "Key is {} bytes, max {}",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    Ok(())
}

/// Encode a key into its fixed-size slot
pub fn encode_key(key: &str) -> Result<[u8; KEY_SLOT_LEN]> {
    validate_key(key)?;
    let mut slot = [0u8; KEY_SLOT_LEN];
    let mut buf = &mut slot[..];
    buf.put_u16(key.len() as u16);
    buf.put_slice(key.as_bytes());
    Ok(slot)
}

/// Decode a key from its slot
pub fn decode_key(bytes: &[u8]) -> Result<String> {
    if bytes.len() < KEY_SLOT_LEN {
        return Err(StoreError::Format(format!(
            "Incomplete key slot: expected {} bytes, got {}",
            KEY_SLOT_LEN,
            bytes.len()
        )));
    }

    let mut buf = &bytes[..KEY_SLOT_LEN];
    let len = buf.get_u16() as usize;
    if len > MAX_KEY_LEN {
        return Err(StoreError::Format(format!(
            "Key length {} exceeds slot (max {})",
            len, MAX_KEY_LEN
        )));
    }

    String::from_utf8(buf[..len].to_vec())
        .map_err(|e| StoreError::Format(format!("Key is not valid UTF-8: {}", e)))
}
