//! Error types for RecordKV
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for RecordKV operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Any lower-level I/O failure. The handle should be treated as suspect
    /// and reopened if further durability guarantees are needed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    // -------------------------------------------------------------------------
    // Handle Errors
    // -------------------------------------------------------------------------
    #[error("Store file is locked by another handle: {}", .0.display())]
    LockAcquisition(PathBuf),

    #[error("Store was opened read-only")]
    ReadOnly,
}
