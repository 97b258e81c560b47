//! Engine Module
//!
//! The record store that coordinates the index, the allocator and file I/O.
//!
//! ## Responsibilities
//! - insert / read / update / delete / exists / count
//! - Order every mutation's writes so a crash never exposes a half-made
//!   record: data, then header, then index, then the commit write
//! - Grow the index region by relocating records out of its way
//! - Validate the file and rebuild free space on open
//!
//! ## Commit Points
//! | Operation            | Commit write                          |
//! |----------------------|---------------------------------------|
//! | insert               | record count (4 bytes)                |
//! | update, fits         | `data_count` of the header (4 bytes)  |
//! | update, grows        | whole header in the key's slot (16)   |
//! | delete, last slot    | record count (4 bytes)                |
//! | delete, other slot   | swap of the last entry into the slot  |
//! |                      | (the count write follows; see `load`) |
//! | index growth         | data start pointer (4 bytes)          |

use std::path::Path;

use tracing::{debug, info, warn};

use crate::allocator::SpaceAllocator;
use crate::config::{StoreConfig, SyncStrategy};
use crate::error::{Result, StoreError};
use crate::format::{
    data_count_offset, decode_entry, encode_entry, encode_key, header_offset, index_region_end,
    slot_offset, validate_key, RecordHeader, StoreHeader, DATA_START_OFFSET, INDEX_ENTRY_LEN,
    RECORD_COUNT_OFFSET, STORE_HEADER_LEN,
};
use crate::index::{Index, IndexEntry};
use crate::io::{FileIo, StorageIo};

/// An open record store
///
/// ## Concurrency Model: single writer
///
/// - One handle owns the file and holds its advisory lock until dropped
/// - Every operation is synchronous and runs to completion or fails
///   before its commit write
/// - Callers sharing a handle across threads must serialize access
///   (see `SharedStore`)
///
/// After an `Io` error the in-memory state may no longer match the file;
/// reopen the store before relying on it further. Space touched by a
/// failed operation is not returned to the allocator until reopen.
pub struct RecordStore<I = FileIo> {
    /// Backing file access
    io: I,

    /// Options the store was opened with
    config: StoreConfig,

    /// In-memory image of the committed index slots
    index: Index,

    /// Free blocks and logical end of file
    allocator: SpaceAllocator,

    /// Boundary between index region and data region
    data_start: u64,
}

impl RecordStore<FileIo> {
    /// Create a new store file; fails if `path` already exists.
    ///
    /// `initial_index_bytes` reserves index space up front so early inserts
    /// do not have to relocate records.
    pub fn create(path: impl AsRef<Path>, initial_index_bytes: u32) -> Result<Self> {
        let config = StoreConfig::builder(path.as_ref())
            .initial_index_bytes(initial_index_bytes)
            .build();
        let io = FileIo::create_new(&config.path)?;
        Self::with_io(io, config)
    }

    /// Open an existing store read-write
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder(path.as_ref())
            .create_if_missing(false)
            .build();
        Self::open_with(config)
    }

    /// Open an existing store read-only under a shared lock
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder(path.as_ref())
            .create_if_missing(false)
            .read_only(true)
            .build();
        Self::open_with(config)
    }

    /// Open or create a store as described by `config`
    pub fn open_with(config: StoreConfig) -> Result<Self> {
        let io = if config.read_only {
            FileIo::open_read_only(&config.path)?
        } else {
            FileIo::open(&config.path, config.create_if_missing)?
        };
        Self::with_io(io, config)
    }
}

impl<I: StorageIo> RecordStore<I> {
    /// Open a store over any `StorageIo`.
    ///
    /// An empty file is formatted as a new store (unless the config forbids
    /// creation); anything else is loaded and validated.
    pub fn with_io(mut io: I, config: StoreConfig) -> Result<Self> {
        let file_len = io.len()?;
        if file_len == 0 {
            if config.read_only || !config.create_if_missing {
                return Err(StoreError::Format(format!(
                    "Store file is empty: {}",
                    config.path.display()
                )));
            }
            return Self::format(io, config);
        }
        Self::load(io, config, file_len)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Insert a new record
    ///
    /// Steps:
    /// 1. Make room for one more index slot
    /// 2. Allocate a block sized to the payload
    /// 3. Write payload, then header, then key into the next slot
    /// 4. Commit by writing the incremented record count
    pub fn insert(&mut self, key: &str, payload: &[u8]) -> Result<()> {
        self.check_writable()?;
        validate_key(key)?;
        if self.index.contains(key) {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }
        let len = payload_len(payload)?;

        let position = self.index.len() as u32;
        let next_count = position.checked_add(1).ok_or_else(|| {
            StoreError::CapacityExceeded(format!("Record count limit reached ({})", position))
        })?;
        self.ensure_index_space(next_count)?;

        let mut block = self.allocator.allocate(len)?;
        block.data_count = len;
        block.index_position = position;

        self.io.write_at(block.data_pointer, payload)?;
        self.io.write_at(header_offset(position), &block.encode())?;
        self.io.write_at(slot_offset(position), &encode_key(key)?)?;
        self.commit(RECORD_COUNT_OFFSET, &next_count.to_be_bytes())?;

        self.index.append(key.to_string(), block)?;

        debug!(
            key,
            position,
            pointer = block.data_pointer,
            capacity = block.data_capacity,
            "inserted record"
        );
        Ok(())
    }

    /// Read a record's payload
    pub fn read(&mut self, key: &str) -> Result<Vec<u8>> {
        let header = *self
            .index
            .lookup(key)
            .ok_or_else(|| StoreError::RecordNotFound(key.to_string()))?;

        let mut payload = vec![0u8; header.data_count as usize];
        self.io.read_at(header.data_pointer, &mut payload)?;
        Ok(payload)
    }

    /// Replace a record's payload
    ///
    /// A payload that fits the record's capacity is written in place and
    /// committed by rewriting `data_count`. A larger payload goes to a
    /// freshly allocated block, committed by rewriting the header in the
    /// key's slot; the old block is then free. Capacity never grows in place.
    pub fn update(&mut self, key: &str, payload: &[u8]) -> Result<()> {
        self.check_writable()?;
        let position = self
            .index
            .position(key)
            .ok_or_else(|| StoreError::RecordNotFound(key.to_string()))?;
        let current = self.entry(position)?.header;
        let len = payload_len(payload)?;

        if len <= current.data_capacity {
            self.io.write_at(current.data_pointer, payload)?;
            self.commit(data_count_offset(position), &len.to_be_bytes())?;

            self.index.set_header(
                position,
                RecordHeader {
                    data_count: len,
                    ..current
                },
            )?;
            debug!(key, position, len, "updated record in place");
            return Ok(());
        }

        let mut block = self.allocator.allocate(len)?;
        block.data_count = len;

        self.io.write_at(block.data_pointer, payload)?;
        self.commit(header_offset(position), &block.encode())?;

        self.index.set_header(position, block)?;
        self.allocator.release(current);

        debug!(
            key,
            position,
            from = current.data_pointer,
            to = block.data_pointer,
            capacity = block.data_capacity,
            "moved record to a larger block"
        );
        Ok(())
    }

    /// Delete a record
    ///
    /// The last index entry is written over the deleted one, then the
    /// decremented count is written. The record's block becomes free; its
    /// bytes are left as they are.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.check_writable()?;
        let position = self
            .index
            .position(key)
            .ok_or_else(|| StoreError::RecordNotFound(key.to_string()))?;
        let last = self.index.len() as u32 - 1;

        if position != last {
            let moved = self.entry(last)?.clone();
            self.io
                .write_at(slot_offset(position), &encode_entry(&moved.key, &moved.header)?)?;
        }
        self.commit(RECORD_COUNT_OFFSET, &last.to_be_bytes())?;

        let removed = self.index.remove_at(position)?;
        self.allocator.release(removed.header);

        debug!(
            key,
            position,
            pointer = removed.header.data_pointer,
            capacity = removed.header.data_capacity,
            "deleted record"
        );
        Ok(())
    }

    /// Whether `key` is stored
    pub fn exists(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Number of committed records
    pub fn count(&self) -> u32 {
        self.index.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Keys in index position order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys()
    }

    /// Copy of the header describing `key`'s storage
    pub fn header(&self, key: &str) -> Option<RecordHeader> {
        self.index.lookup(key).copied()
    }

    /// Flush file contents to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.io.sync()
    }

    /// Sync and release the file (and its lock)
    pub fn close(mut self) -> Result<()> {
        if !self.config.read_only {
            self.io.sync()?;
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Free blocks the allocator would hand out, in scan order
    pub fn free_blocks(&self) -> &[RecordHeader] {
        self.allocator.free_blocks()
    }

    /// Start of the data region
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Logical end of the file (where the next appended block goes)
    pub fn file_len(&self) -> u64 {
        self.allocator.end_of_file()
    }

    /// Index slot of `key`
    pub fn position(&self, key: &str) -> Option<u32> {
        self.index.position(key)
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    // =========================================================================
    // Open / Format
    // =========================================================================

    /// Write the header of a brand new store
    fn format(mut io: I, config: StoreConfig) -> Result<Self> {
        let slots = config.initial_index_bytes.div_ceil(INDEX_ENTRY_LEN as u32);
        let data_start = index_region_end(slots);
        let header = StoreHeader {
            record_count: 0,
            data_start: to_u32_pointer(data_start)?,
        };

        io.write_at(0, &header.encode())?;
        if data_start > STORE_HEADER_LEN as u64 {
            io.set_len(data_start)?;
        }
        if config.sync_strategy == SyncStrategy::EveryCommit {
            io.sync()?;
        }

        info!(
            path = %config.path.display(),
            data_start,
            index_slots = slots,
            "created record store"
        );

        Ok(Self {
            io,
            config,
            index: Index::new(),
            allocator: SpaceAllocator::new(data_start),
            data_start,
        })
    }

    /// Read and validate an existing store
    fn load(mut io: I, config: StoreConfig, file_len: u64) -> Result<Self> {
        if file_len < STORE_HEADER_LEN as u64 {
            return Err(StoreError::Format(format!(
                "File is {} bytes, shorter than the store header",
                file_len
            )));
        }

        let mut raw_header = [0u8; STORE_HEADER_LEN];
        io.read_at(0, &mut raw_header)?;
        let store_header = StoreHeader::decode(&raw_header)?;
        let data_start = store_header.data_start as u64;
        let index_end = index_region_end(store_header.record_count);

        if index_end > data_start {
            return Err(StoreError::Format(format!(
                "{} index entries overrun data start {}",
                store_header.record_count, data_start
            )));
        }
        if index_end > file_len {
            return Err(StoreError::Format(format!(
                "Index region ends at {} but file is {} bytes",
                index_end, file_len
            )));
        }

        let mut raw_index = vec![0u8; (index_end - STORE_HEADER_LEN as u64) as usize];
        io.read_at(STORE_HEADER_LEN as u64, &mut raw_index)?;
        let mut entries = raw_index
            .chunks_exact(INDEX_ENTRY_LEN)
            .map(|chunk| decode_entry(chunk).map(|(key, header)| IndexEntry { key, header }))
            .collect::<Result<Vec<_>>>()?;

        let interrupted_delete = ends_with_swapped_entry(&entries);
        if interrupted_delete {
            entries.pop();
        }

        let end_of_file = file_len.max(data_start);
        validate_headers(&entries, data_start, end_of_file)?;

        let index = Index::from_entries(entries).map_err(|e| match e {
            StoreError::DuplicateKey(key) => {
                StoreError::Format(format!("Duplicate key in index: {}", key))
            }
            other => other,
        })?;
        let allocator = SpaceAllocator::rebuild(data_start, end_of_file, index.headers());

        let mut store = Self {
            io,
            config,
            index,
            allocator,
            data_start,
        };

        if interrupted_delete {
            let count = store.count();
            warn!(
                path = %store.config.path.display(),
                stored_count = store_header.record_count,
                count,
                "completing interrupted delete"
            );
            if !store.config.read_only {
                store.commit(RECORD_COUNT_OFFSET, &count.to_be_bytes())?;
            }
        }

        info!(
            path = %store.config.path.display(),
            records = store.count(),
            data_start,
            free_blocks = store.allocator.free_blocks().len(),
            free_bytes = store.allocator.free_bytes(),
            "opened record store"
        );
        Ok(store)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_writable(&self) -> Result<()> {
        if self.config.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    fn entry(&self, position: u32) -> Result<&IndexEntry> {
        self.index.get(position).ok_or_else(|| {
            StoreError::Format(format!("Index has no entry at position {}", position))
        })
    }

    /// Issue a commit write, bracketed by syncs when configured
    fn commit(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let sync = self.config.sync_strategy == SyncStrategy::EveryCommit;
        if sync {
            self.io.sync()?;
        }
        self.io.write_at(offset, bytes)?;
        if sync {
            self.io.sync()?;
        }
        Ok(())
    }

    /// Grow the index region until it holds `slots` entries.
    ///
    /// Walks the data region from its start up to the new boundary: live
    /// records there are relocated to the end of the file, free blocks are
    /// claimed. The new boundary is committed with one write.
    fn ensure_index_space(&mut self, slots: u32) -> Result<()> {
        let required = index_region_end(slots);
        if required <= self.data_start {
            return Ok(());
        }
        to_u32_pointer(required)?;

        // Relocated records must land past the new boundary
        self.allocator.extend_to(required);

        let mut cursor = self.data_start;
        while cursor < required {
            if let Some(position) = self.index.position_by_pointer(cursor) {
                cursor = self.relocate(position)?;
            } else if let Some(end) = self.allocator.claim_at(cursor, required) {
                cursor = end;
            } else {
                // Bytes nobody owns; skip to the next known block
                let next_live = self
                    .index
                    .headers()
                    .map(|header| header.data_pointer)
                    .filter(|&pointer| pointer > cursor)
                    .min();
                let next_free = self.allocator.next_free_after(cursor);
                cursor = [next_live, next_free]
                    .into_iter()
                    .flatten()
                    .fold(required, u64::min);
            }
        }

        let data_start = to_u32_pointer(cursor)?;
        self.commit(DATA_START_OFFSET, &data_start.to_be_bytes())?;

        debug!(from = self.data_start, to = cursor, slots, "grew index region");
        self.data_start = cursor;
        Ok(())
    }

    /// Move the record in slot `position` to the end of the file.
    ///
    /// Copies its whole capacity, then rewrites its header in one write.
    /// Returns the end of the block it used to occupy.
    fn relocate(&mut self, position: u32) -> Result<u64> {
        let entry = self.entry(position)?.clone();
        let old = entry.header;

        let mut moved = self.allocator.allocate_at_end(old.data_capacity)?;
        moved.data_count = old.data_count;

        let mut bytes = vec![0u8; old.data_capacity as usize];
        self.io.read_at(old.data_pointer, &mut bytes)?;
        self.io.write_at(moved.data_pointer, &bytes)?;
        self.io.write_at(header_offset(position), &moved.encode())?;

        self.index.set_header(position, moved)?;

        debug!(
            key = %entry.key,
            from = old.data_pointer,
            to = moved.data_pointer,
            "relocated record for index growth"
        );
        Ok(old.end())
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Payload length as a record size (1..=u32::MAX)
fn payload_len(payload: &[u8]) -> Result<u32> {
    if payload.is_empty() {
        return Err(StoreError::InvalidSize("Payload is empty".to_string()));
    }
    u32::try_from(payload.len()).map_err(|_| {
        StoreError::InvalidSize(format!("Payload of {} bytes is too large", payload.len()))
    })
}

/// The data start pointer is stored in 4 bytes
fn to_u32_pointer(offset: u64) -> Result<u32> {
    u32::try_from(offset).map_err(|_| {
        StoreError::CapacityExceeded(format!(
            "Index region would end at {}, beyond the 4-byte data start pointer",
            offset
        ))
    })
}

/// A delete of a non-last slot whose count write never landed leaves the
/// last committed slot as an exact copy of an earlier one. No other valid
/// sequence of writes produces a repeated entry.
fn ends_with_swapped_entry(entries: &[IndexEntry]) -> bool {
    match entries.split_last() {
        Some((last, rest)) => rest.iter().any(|entry| entry == last),
        None => false,
    }
}

/// Check every header against the file bounds and each other
fn validate_headers(entries: &[IndexEntry], data_start: u64, end_of_file: u64) -> Result<()> {
    for (position, entry) in entries.iter().enumerate() {
        let header = &entry.header;
        if header.data_capacity < 1 || header.data_count > header.data_capacity {
            return Err(StoreError::Format(format!(
                "Slot {} ({}): count {} / capacity {}",
                position, entry.key, header.data_count, header.data_capacity
            )));
        }
        let end = header.checked_end().ok_or_else(|| {
            StoreError::Format(format!(
                "Slot {} ({}): block at {} with capacity {} overflows",
                position, entry.key, header.data_pointer, header.data_capacity
            ))
        })?;
        if header.data_pointer < data_start || end > end_of_file {
            return Err(StoreError::Format(format!(
                "Slot {} ({}): block [{}, {}) outside data region [{}, {})",
                position, entry.key, header.data_pointer, end, data_start, end_of_file
            )));
        }
    }

    let mut ranges: Vec<(u64, u64)> = entries
        .iter()
        .map(|entry| (entry.header.data_pointer, entry.header.end()))
        .collect();
    ranges.sort_unstable();
    for pair in ranges.windows(2) {
        if pair[1].0 < pair[0].1 {
            return Err(StoreError::Format(format!(
                "Overlapping blocks at {} and {}",
                pair[0].0, pair[1].0
            )));
        }
    }
    Ok(())
}
