//! Tests for SpaceAllocator
//!
//! These tests verify:
//! - Growth at end of file when nothing is free
//! - First-fit reuse, exact and with split
//! - Oldest-freed-first scan order
//! - No coalescing of neighbouring free blocks
//! - Free space rebuilt from gaps between live records
//! - Claiming blocks for index growth

use recordkv::allocator::SpaceAllocator;
use recordkv::format::RecordHeader;
use recordkv::StoreError;

// =============================================================================
// Helper Functions
// =============================================================================

fn block(pointer: u64, capacity: u32) -> RecordHeader {
    RecordHeader::new(pointer, capacity).unwrap()
}

fn free_ranges(allocator: &SpaceAllocator) -> Vec<(u64, u32)> {
    allocator
        .free_blocks()
        .iter()
        .map(|b| (b.data_pointer, b.data_capacity))
        .collect()
}

// =============================================================================
// Growth Tests
// =============================================================================

#[test]
fn test_allocate_grows_file_when_empty() {
    let mut allocator = SpaceAllocator::new(100);

    let first = allocator.allocate(10).unwrap();
    let second = allocator.allocate(5).unwrap();

    assert_eq!((first.data_pointer, first.data_capacity), (100, 10));
    assert_eq!((second.data_pointer, second.data_capacity), (110, 5));
    assert_eq!(allocator.end_of_file(), 115);
}

#[test]
fn test_allocate_zero_fails() {
    let mut allocator = SpaceAllocator::new(100);

    assert!(matches!(
        allocator.allocate(0),
        Err(StoreError::InvalidSize(_))
    ));
    assert_eq!(allocator.end_of_file(), 100);
}

// =============================================================================
// Reuse Tests
// =============================================================================

#[test]
fn test_exact_fit_reuses_whole_block() {
    let mut allocator = SpaceAllocator::new(200);
    allocator.release(block(100, 20));

    let reused = allocator.allocate(20).unwrap();

    assert_eq!((reused.data_pointer, reused.data_capacity), (100, 20));
    assert!(allocator.free_blocks().is_empty());
    assert_eq!(allocator.end_of_file(), 200);
}

#[test]
fn test_smaller_request_splits_block() {
    let mut allocator = SpaceAllocator::new(200);
    allocator.release(block(100, 20));

    let reused = allocator.allocate(8).unwrap();

    assert_eq!((reused.data_pointer, reused.data_capacity), (100, 8));
    assert_eq!(free_ranges(&allocator), vec![(108, 12)]);
    assert_eq!(allocator.end_of_file(), 200);
}

#[test]
fn test_first_fit_takes_oldest_freed_block() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(500, 50));
    allocator.release(block(100, 50));

    let reused = allocator.allocate(50).unwrap();

    assert_eq!(reused.data_pointer, 500);
    assert_eq!(free_ranges(&allocator), vec![(100, 50)]);
}

#[test]
fn test_first_fit_skips_too_small_blocks() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(100, 4));
    allocator.release(block(200, 40));

    let reused = allocator.allocate(10).unwrap();

    assert_eq!(reused.data_pointer, 200);
    assert_eq!(free_ranges(&allocator), vec![(100, 4), (210, 30)]);
}

#[test]
fn test_remainder_keeps_scan_position() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(100, 30));
    allocator.release(block(300, 30));

    allocator.allocate(10).unwrap();

    assert_eq!(free_ranges(&allocator), vec![(110, 20), (300, 30)]);
}

#[test]
fn test_adjacent_free_blocks_are_not_merged() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(100, 10));
    allocator.release(block(110, 10));

    let grown = allocator.allocate(15).unwrap();

    assert_eq!(grown.data_pointer, 1000);
    assert_eq!(free_ranges(&allocator), vec![(100, 10), (110, 10)]);
}

#[test]
fn test_release_clears_count() {
    let mut allocator = SpaceAllocator::new(1000);
    let mut used = block(100, 10);
    used.data_count = 7;
    used.index_position = 3;

    allocator.release(used);

    let free = allocator.free_blocks()[0];
    assert_eq!(free.data_count, 0);
    assert_eq!(free.index_position, 0);
    assert_eq!(allocator.free_bytes(), 10);
}

// =============================================================================
// Rebuild Tests
// =============================================================================

#[test]
fn test_rebuild_finds_gaps_between_live_records() {
    let live = [block(150, 10), block(100, 20), block(180, 5)];

    let allocator = SpaceAllocator::rebuild(88, 200, live.iter());

    assert_eq!(
        free_ranges(&allocator),
        vec![(88, 12), (120, 30), (160, 20), (185, 15)]
    );
    assert_eq!(allocator.end_of_file(), 200);
}

#[test]
fn test_rebuild_with_tightly_packed_records() {
    let live = [block(8, 10), block(18, 10)];

    let allocator = SpaceAllocator::rebuild(8, 28, live.iter());

    assert!(allocator.free_blocks().is_empty());
}

#[test]
fn test_rebuild_empty_store() {
    let allocator = SpaceAllocator::rebuild(88, 88, std::iter::empty());

    assert!(allocator.free_blocks().is_empty());
    assert_eq!(allocator.end_of_file(), 88);
}

// =============================================================================
// Claim Tests
// =============================================================================

#[test]
fn test_claim_whole_block_below_limit() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(100, 20));

    assert_eq!(allocator.claim_at(100, 500), Some(120));
    assert!(allocator.free_blocks().is_empty());
}

#[test]
fn test_claim_splits_block_straddling_limit() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(100, 50));

    assert_eq!(allocator.claim_at(100, 130), Some(130));
    assert_eq!(free_ranges(&allocator), vec![(130, 20)]);
}

#[test]
fn test_claim_missing_block() {
    let mut allocator = SpaceAllocator::new(1000);
    allocator.release(block(100, 50));

    assert_eq!(allocator.claim_at(120, 200), None);
    assert_eq!(allocator.next_free_after(50), Some(100));
    assert_eq!(allocator.next_free_after(100), None);
}
