//! Tests for Index
//!
//! These tests verify:
//! - Append at the end and duplicate rejection
//! - Swap-with-last removal keeps positions dense
//! - Header replacement keeps the slot
//! - Lookup by pointer (used for index growth)

use recordkv::format::RecordHeader;
use recordkv::index::{Index, IndexEntry};
use recordkv::StoreError;

// =============================================================================
// Helper Functions
// =============================================================================

fn header(pointer: u64) -> RecordHeader {
    RecordHeader::new(pointer, 10).unwrap()
}

fn index_with(keys: &[&str]) -> Index {
    let mut index = Index::new();
    for (i, key) in keys.iter().enumerate() {
        index.append(key.to_string(), header(1000 + i as u64 * 10)).unwrap();
    }
    index
}

fn assert_dense(index: &Index) {
    for (position, entry) in index.iter().enumerate() {
        assert_eq!(entry.header.index_position, position as u32);
        assert_eq!(index.position(&entry.key), Some(position as u32));
    }
}

// =============================================================================
// Append / Lookup Tests
// =============================================================================

#[test]
fn test_new_index_is_empty() {
    let index = Index::new();

    assert!(index.is_empty());
    assert_eq!(index.len(), 0);
    assert!(index.lookup("a").is_none());
}

#[test]
fn test_append_returns_next_position() {
    let mut index = Index::new();

    assert_eq!(index.append("a".into(), header(100)).unwrap(), 0);
    assert_eq!(index.append("b".into(), header(200)).unwrap(), 1);
    assert_eq!(index.append("c".into(), header(300)).unwrap(), 2);

    assert_eq!(index.len(), 3);
    assert_eq!(index.lookup("b").unwrap().data_pointer, 200);
    assert_eq!(index.lookup("b").unwrap().index_position, 1);
}

#[test]
fn test_append_duplicate_key_fails() {
    let mut index = index_with(&["a"]);

    let result = index.append("a".into(), header(500));

    assert!(matches!(result, Err(StoreError::DuplicateKey(k)) if k == "a"));
    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup("a").unwrap().data_pointer, 1000);
}

#[test]
fn test_from_entries_rejects_duplicates() {
    let entries = vec![
        IndexEntry {
            key: "x".into(),
            header: header(100),
        },
        IndexEntry {
            key: "x".into(),
            header: header(200),
        },
    ];

    assert!(matches!(
        Index::from_entries(entries),
        Err(StoreError::DuplicateKey(_))
    ));
}

#[test]
fn test_from_entries_assigns_positions() {
    let entries = vec![
        IndexEntry {
            key: "x".into(),
            header: header(100),
        },
        IndexEntry {
            key: "y".into(),
            header: header(200),
        },
    ];

    let index = Index::from_entries(entries).unwrap();

    assert_dense(&index);
    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["x", "y"]);
}

// =============================================================================
// Remove Tests
// =============================================================================

#[test]
fn test_remove_at_moves_last_into_hole() {
    let mut index = index_with(&["a", "b", "c", "d"]);

    let removed = index.remove_at(1).unwrap();

    assert_eq!(removed.key, "b");
    assert_eq!(index.len(), 3);
    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["a", "d", "c"]);
    assert_eq!(index.position("d"), Some(1));
    assert!(!index.contains("b"));
    assert_dense(&index);
}

#[test]
fn test_remove_last_position() {
    let mut index = index_with(&["a", "b", "c"]);

    let removed = index.remove_at(2).unwrap();

    assert_eq!(removed.key, "c");
    assert_eq!(index.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_dense(&index);
}

#[test]
fn test_remove_only_entry() {
    let mut index = index_with(&["a"]);

    index.remove_at(0).unwrap();

    assert!(index.is_empty());
    assert!(index.last().is_none());
}

#[test]
fn test_remove_out_of_range() {
    let mut index = index_with(&["a"]);

    assert!(matches!(
        index.remove_at(1),
        Err(StoreError::RecordNotFound(_))
    ));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_positions_stay_dense_through_mixed_operations() {
    let mut index = Index::new();
    for i in 0..20u64 {
        index.append(format!("k{}", i), header(i * 10)).unwrap();
    }
    for position in [0u32, 5, 17, 3, 3, 0] {
        index.remove_at(position).unwrap();
        assert_dense(&index);
    }
    index.append("fresh".into(), header(9999)).unwrap();

    assert_eq!(index.len(), 15);
    assert_eq!(index.position("fresh"), Some(14));
    assert_dense(&index);
}

// =============================================================================
// Header Replacement Tests
// =============================================================================

#[test]
fn test_set_header_keeps_position() {
    let mut index = index_with(&["a", "b"]);

    index.set_header(1, RecordHeader::new(5000, 64).unwrap()).unwrap();

    let header = index.lookup("b").unwrap();
    assert_eq!(header.data_pointer, 5000);
    assert_eq!(header.data_capacity, 64);
    assert_eq!(header.index_position, 1);
}

#[test]
fn test_position_by_pointer() {
    let index = index_with(&["a", "b", "c"]);

    assert_eq!(index.position_by_pointer(1010), Some(1));
    assert_eq!(index.position_by_pointer(1005), None);
}
