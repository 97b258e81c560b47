//! Shared store handle
//!
//! Serializes callers from several threads onto one `RecordStore`.
//! Each call holds the mutex for one whole logical operation, which is
//! exactly the one-operation-at-a-time discipline the engine requires.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::RecordStore;
use crate::error::Result;
use crate::io::{FileIo, StorageIo};

/// Cloneable, thread-safe handle to a record store
pub struct SharedStore<I = FileIo> {
    inner: Arc<Mutex<RecordStore<I>>>,
}

impl<I> Clone for SharedStore<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: StorageIo> SharedStore<I> {
    pub fn new(store: RecordStore<I>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn insert(&self, key: &str, payload: &[u8]) -> Result<()> {
        self.inner.lock().insert(key, payload)
    }

    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.inner.lock().read(key)
    }

    pub fn update(&self, key: &str, payload: &[u8]) -> Result<()> {
        self.inner.lock().update(key, payload)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().delete(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.inner.lock().exists(key)
    }

    pub fn count(&self) -> u32 {
        self.inner.lock().count()
    }

    /// Keys in index position order (snapshot)
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys().map(str::to_string).collect()
    }

    pub fn sync(&self) -> Result<()> {
        self.inner.lock().sync()
    }

    /// Run `f` with exclusive access to the store
    pub fn with_store<R>(&self, f: impl FnOnce(&mut RecordStore<I>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
