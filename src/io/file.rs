//! File-backed storage I/O
//!
//! Opens the store file and holds an advisory lock on it for as long as
//! the handle lives.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use fd_lock::RwLock;

use crate::error::{Result, StoreError};

use super::StorageIo;

/// Production `StorageIo` over a locked `std::fs::File`
///
/// The advisory lock is released when the file is closed.
#[derive(Debug)]
pub struct FileIo {
    file: File,
}

impl FileIo {
    /// Open `path` read-write under an exclusive lock
    pub fn open(path: &Path, create: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(path)?;
        Self::locked(file, path, false)
    }

    /// Create `path`, which must not exist, under an exclusive lock
    pub fn create_new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Self::locked(file, path, false)
    }

    /// Open an existing `path` read-only under a shared lock
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Self::locked(file, path, true)
    }

    /// Take the advisory lock without blocking.
    ///
    /// The guard is forgotten rather than stored: flock-style locks belong
    /// to the open file description and are released when `file` closes.
    fn locked(file: File, path: &Path, shared: bool) -> Result<Self> {
        let mut lock = RwLock::new(file);
        let acquired = if shared {
            lock.try_read().map(std::mem::forget)
        } else {
            lock.try_write().map(std::mem::forget)
        };

        match acquired {
            Ok(()) => Ok(Self {
                file: lock.into_inner(),
            }),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                Err(StoreError::LockAcquisition(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl StorageIo for FileIo {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        Ok(())
    }

    fn len(&mut self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn set_len(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }
}
