//! Space Allocator
//!
//! Finds or creates byte ranges in the data region.
//!
//! ## Responsibilities
//! - Hand out exact-fit blocks for new or grown records
//! - Reuse space left behind by deleted records (first fit, split)
//! - Grow the file when nothing free is large enough
//!
//! Free blocks are only ever subdivided, never merged back together.
//! The allocator never writes to the file; a block becomes durable only
//! when the engine commits a header that points at it.

use crate::error::{Result, StoreError};
use crate::format::RecordHeader;

/// Tracks free blocks and the logical end of file
#[derive(Debug, Default)]
pub struct SpaceAllocator {
    /// Free blocks in scan order (oldest freed first)
    free: Vec<RecordHeader>,
    /// Where the next block is placed when nothing free fits
    end_of_file: u64,
}

impl SpaceAllocator {
    /// An allocator with no free blocks
    pub fn new(end_of_file: u64) -> Self {
        Self {
            free: Vec::new(),
            end_of_file,
        }
    }

    /// Rebuild free blocks from the gaps between live records.
    ///
    /// Every byte of `[data_start, end_of_file)` not covered by a live
    /// header becomes free, in ascending pointer order.
    pub fn rebuild<'a>(
        data_start: u64,
        end_of_file: u64,
        live: impl IntoIterator<Item = &'a RecordHeader>,
    ) -> Self {
        let mut ranges: Vec<(u64, u64)> = live
            .into_iter()
            .map(|header| (header.data_pointer, header.end()))
            .collect();
        ranges.sort_unstable();

        let mut allocator = Self::new(end_of_file);
        let mut cursor = data_start;
        for (start, end) in ranges {
            allocator.push_gap(cursor, start);
            cursor = cursor.max(end);
        }
        allocator.push_gap(cursor, end_of_file);
        allocator
    }

    /// Find or create a block of exactly `required` bytes
    pub fn allocate(&mut self, required: u32) -> Result<RecordHeader> {
        if required < 1 {
            return Err(StoreError::InvalidSize(format!(
                "Cannot allocate {} bytes",
                required
            )));
        }

        if let Some(slot) = self
            .free
            .iter()
            .position(|block| block.data_capacity >= required)
        {
            let block = self.free[slot];
            if block.data_capacity == required {
                self.free.remove(slot);
                return Ok(block);
            }
            let (taken, remainder) = block.split(required)?;
            self.free[slot] = remainder;
            return Ok(taken);
        }

        self.allocate_at_end(required)
    }

    /// Place a block of `required` bytes at the end of the file
    pub fn allocate_at_end(&mut self, required: u32) -> Result<RecordHeader> {
        let block = RecordHeader::new(self.end_of_file, required)?;
        self.end_of_file = block.end();
        Ok(block)
    }

    /// Make a block available for future allocations
    pub fn release(&mut self, block: RecordHeader) {
        self.free.push(RecordHeader {
            data_count: 0,
            index_position: 0,
            ..block
        });
    }

    /// Remove the free block starting at `pointer`, keeping any part of it
    /// at or beyond `limit` free.
    ///
    /// Returns the end of the claimed range, or `None` if no free block
    /// starts at `pointer`.
    pub fn claim_at(&mut self, pointer: u64, limit: u64) -> Option<u64> {
        let slot = self
            .free
            .iter()
            .position(|block| block.data_pointer == pointer)?;
        let block = self.free[slot];

        if limit > pointer && block.end() > limit {
            if let Ok((_, remainder)) = block.split((limit - pointer) as u32) {
                self.free[slot] = remainder;
                return Some(limit);
            }
        }

        self.free.remove(slot);
        Some(block.end())
    }

    /// Lowest free block pointer strictly after `pointer`
    pub fn next_free_after(&self, pointer: u64) -> Option<u64> {
        self.free
            .iter()
            .map(|block| block.data_pointer)
            .filter(|&start| start > pointer)
            .min()
    }

    /// Move the logical end of file forward to at least `len`
    pub fn extend_to(&mut self, len: u64) {
        self.end_of_file = self.end_of_file.max(len);
    }

    /// Free blocks in scan order
    pub fn free_blocks(&self) -> &[RecordHeader] {
        &self.free
    }

    /// Total free bytes
    pub fn free_bytes(&self) -> u64 {
        self.free.iter().map(|block| block.data_capacity as u64).sum()
    }

    pub fn end_of_file(&self) -> u64 {
        self.end_of_file
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Record `[start, end)` as free, in blocks no larger than u32::MAX
    fn push_gap(&mut self, mut start: u64, end: u64) {
        while start < end {
            let len = (end - start).min(u32::MAX as u64) as u32;
            self.free.push(RecordHeader {
                data_pointer: start,
                data_capacity: len,
                data_count: 0,
                index_position: 0,
            });
            start += len as u64;
        }
    }
}
