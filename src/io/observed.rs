//! Write interception
//!
//! `ObservedIo` wraps any `StorageIo` and reports each physical write call
//! to a `WriteObserver`. It is composed around `FileIo` in tests only; the
//! production engine is instantiated over plain `FileIo`.

use std::io;

use crate::error::Result;

use super::StorageIo;

/// Hook invoked once per physical write call
pub trait WriteObserver {
    /// Called before the write reaches the file. An error aborts the call
    /// and nothing is written.
    fn before_write(&mut self, _offset: u64, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }

    /// Called after the write reached the file. An error is returned to
    /// the caller even though the bytes landed.
    fn after_write(&mut self, _offset: u64, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// `StorageIo` decorator that routes writes through a `WriteObserver`
#[derive(Debug)]
pub struct ObservedIo<I, O> {
    inner: I,
    observer: O,
}

impl<I: StorageIo, O: WriteObserver> ObservedIo<I, O> {
    pub fn new(inner: I, observer: O) -> Self {
        Self { inner, observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<I: StorageIo, O: WriteObserver> StorageIo for ObservedIo<I, O> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.inner.read_at(offset, buf)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.observer.before_write(offset, data)?;
        self.inner.write_at(offset, data)?;
        self.observer.after_write(offset, data)?;
        Ok(())
    }

    fn len(&mut self) -> Result<u64> {
        self.inner.len()
    }

    fn set_len(&mut self, len: u64) -> Result<()> {
        self.inner.set_len(len)
    }

    fn sync(&mut self) -> Result<()> {
        self.inner.sync()
    }
}
