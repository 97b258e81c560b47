//! Configuration for RecordKV
//!
//! Every store is opened against an explicit path; there are no
//! process-wide defaults for where files live.

use std::path::{Path, PathBuf};

/// Configuration for opening or creating a record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the single backing file
    pub path: PathBuf,

    /// Bytes of index space reserved when a new store is created.
    /// Rounded up to whole index slots. Ignored for existing stores.
    pub initial_index_bytes: u32,

    /// Create the file if it does not exist yet
    pub create_if_missing: bool,

    /// Open with a shared lock; all mutators fail with `ReadOnly`
    pub read_only: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// When to ask the OS to flush file contents to stable storage
    pub sync_strategy: SyncStrategy,
}

/// Sync strategy around commit writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// `sync_data` before the commit write (so everything it publishes is
    /// durable first) and again after it
    EveryCommit,

    /// Never sync explicitly; leave flushing to the OS
    Never,
}

impl StoreConfig {
    /// Config for `path` with default settings
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            initial_index_bytes: 0,
            create_if_missing: true,
            read_only: false,
            sync_strategy: SyncStrategy::EveryCommit,
        }
    }

    /// Create a new config builder
    pub fn builder(path: impl Into<PathBuf>) -> StoreConfigBuilder {
        StoreConfigBuilder {
            config: Self::new(path),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Builder for StoreConfig
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the index space reserved for a new store (in bytes)
    pub fn initial_index_bytes(mut self, bytes: u32) -> Self {
        self.config.initial_index_bytes = bytes;
        self
    }

    /// Create the file when missing
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.create_if_missing = create;
        self
    }

    /// Open read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.config.read_only = read_only;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
