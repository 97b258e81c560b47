//! Index Module
//!
//! Dense, position-ordered collection of (key, header) entries.
//!
//! ## Responsibilities
//! - Map keys to record headers
//! - Keep positions `0..len-1` gap free
//! - Mirror the on-disk index slots one to one
//!
//! ## Data Structure Choice
//! A `Vec` holds entries in slot order; a `HashMap` from key to position
//! makes lookups O(1). Removal swaps the last entry into the hole, so a
//! key's position may change after any delete.

mod table;

pub use table::Index;

use crate::format::RecordHeader;

/// One index slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: String,
    pub header: RecordHeader,
}
