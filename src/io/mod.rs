//! I/O Module
//!
//! Positioned reads and writes against the single backing file.
//!
//! ## Responsibilities
//! - `StorageIo`: the capability the engine is generic over
//! - `FileIo`: the production implementation, holding the advisory lock
//! - `ObservedIo`: a decorator that reports every physical write call to a
//!   `WriteObserver` and lets it fail the call
//! - `CrashAtWrite` / `WriteRecorder`: observers for fault-injection tests,
//!   behind the `fault-injection` feature
//!
//! Every `write_at` is one physical write call. The engine's crash-safety
//! argument counts on that: a header or a commit field is never split
//! across calls.

#[cfg(feature = "fault-injection")]
mod fault;
mod file;
mod observed;

#[cfg(feature = "fault-injection")]
pub use fault::{CrashAtWrite, CrashPhase, WriteRecord, WriteRecorder};
pub use file::FileIo;
pub use observed::{ObservedIo, WriteObserver};

use crate::error::Result;

/// Positioned access to the store file
pub trait StorageIo {
    /// Fill `buf` from `offset`; short files are an error
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Write all of `data` at `offset` as one physical write call
    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()>;

    /// Current physical length
    fn len(&mut self) -> Result<u64>;

    /// Set the physical length (only used when formatting a new store)
    fn set_len(&mut self, len: u64) -> Result<()>;

    /// Flush file contents to stable storage
    fn sync(&mut self) -> Result<()>;
}
