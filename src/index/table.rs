//! Index implementation
//!
//! Vec of entries in slot order plus a key → position map.

use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::format::RecordHeader;

use super::IndexEntry;

/// In-memory image of the index region
#[derive(Debug, Default)]
pub struct Index {
    /// Entries in slot order
    entries: Vec<IndexEntry>,
    /// key → slot position
    positions: HashMap<String, usize>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries in slot order, rejecting duplicate keys
    pub fn from_entries(entries: Vec<IndexEntry>) -> Result<Self> {
        let mut index = Self {
            entries: Vec::with_capacity(entries.len()),
            positions: HashMap::with_capacity(entries.len()),
        };
        for entry in entries {
            index.append(entry.key, entry.header)?;
        }
        Ok(index)
    }

    /// Header for `key`, if indexed
    pub fn lookup(&self, key: &str) -> Option<&RecordHeader> {
        self.positions
            .get(key)
            .map(|&position| &self.entries[position].header)
    }

    /// Slot position of `key`, if indexed
    pub fn position(&self, key: &str) -> Option<u32> {
        self.positions.get(key).map(|&position| position as u32)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Add an entry at the next free position
    pub fn append(&mut self, key: String, mut header: RecordHeader) -> Result<u32> {
        if self.positions.contains_key(&key) {
            return Err(StoreError::DuplicateKey(key));
        }
        let position = self.entries.len();
        header.index_position = position as u32;
        self.positions.insert(key.clone(), position);
        self.entries.push(IndexEntry { key, header });
        Ok(position as u32)
    }

    /// Remove the entry at `position` by moving the last entry into it.
    ///
    /// Returns the removed entry.
    pub fn remove_at(&mut self, position: u32) -> Result<IndexEntry> {
        let position = position as usize;
        if position >= self.entries.len() {
            return Err(StoreError::RecordNotFound(format!(
                "No index entry at position {} (len {})",
                position,
                self.entries.len()
            )));
        }

        let removed = self.entries.swap_remove(position);
        self.positions.remove(&removed.key);

        if let Some(moved) = self.entries.get_mut(position) {
            moved.header.index_position = position as u32;
            self.positions.insert(moved.key.clone(), position);
        }

        Ok(removed)
    }

    /// Replace the header of the entry at `position`, keeping its slot
    pub fn set_header(&mut self, position: u32, mut header: RecordHeader) -> Result<()> {
        let entry = self.entries.get_mut(position as usize).ok_or_else(|| {
            StoreError::RecordNotFound(format!("No index entry at position {}", position))
        })?;
        header.index_position = position;
        entry.header = header;
        Ok(())
    }

    /// Entry at `position`
    pub fn get(&self, position: u32) -> Option<&IndexEntry> {
        self.entries.get(position as usize)
    }

    /// Last entry (the one a removal would move)
    pub fn last(&self) -> Option<&IndexEntry> {
        self.entries.last()
    }

    /// Position of the live record whose data starts at `data_pointer`
    pub fn position_by_pointer(&self, data_pointer: u64) -> Option<u32> {
        self.entries
            .iter()
            .position(|entry| entry.header.data_pointer == data_pointer)
            .map(|position| position as u32)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Headers in slot order
    pub fn headers(&self) -> impl Iterator<Item = &RecordHeader> {
        self.entries.iter().map(|entry| &entry.header)
    }
}
