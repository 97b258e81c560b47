//! # RecordKV
//!
//! An embedded, single-file keyed record store:
//! - String keys mapped to variable-length byte payloads
//! - Free space from deleted records reused (first fit, split)
//! - Crash-atomic mutations through a fixed write order
//! - Single writer per file, enforced by an advisory lock
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RecordStore                            │
//! │       insert / read / update / delete / exists / count       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌────────────────┐
//!   │    Index    │          │ SpaceAllocator │
//!   │ (key→slot)  │          │  (free blocks) │
//!   └──────┬──────┘          └───────┬────────┘
//!          └────────────┬────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │    format    │  StoreHeader / RecordHeader / key slots
//!               └──────┬───────┘
//!                      ▼
//!               ┌──────────────┐
//!               │  StorageIo   │  FileIo (locked) or ObservedIo in tests
//!               └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use recordkv::RecordStore;
//!
//! # fn main() -> recordkv::Result<()> {
//! let mut store = RecordStore::create("records.db", 0)?;
//! store.insert("a", &[1, 2, 3])?;
//! assert_eq!(store.read("a")?, vec![1, 2, 3]);
//! store.delete("a")?;
//! assert!(!store.exists("a"));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod format;
pub mod index;
pub mod allocator;
pub mod io;
pub mod engine;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{StoreConfig, SyncStrategy};
pub use engine::RecordStore;
pub use shared::SharedStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RecordKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
