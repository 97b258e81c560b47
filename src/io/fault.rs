//! Fault-injection observers
//!
//! Used with `ObservedIo` to enumerate the write calls of an operation and
//! to fail one of them, simulating a crash at that point.

use std::io;

use super::WriteObserver;

/// One observed physical write call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub offset: u64,
    pub len: usize,
}

/// Records every write call without interfering
#[derive(Debug, Default)]
pub struct WriteRecorder {
    writes: Vec<WriteRecord>,
}

impl WriteRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes seen so far, in call order
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }
}

impl WriteObserver for WriteRecorder {
    fn before_write(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.writes.push(WriteRecord {
            offset,
            len: data.len(),
        });
        Ok(())
    }
}

/// Which side of the write the simulated crash lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPhase {
    /// The write never reaches the file
    BeforeWrite,
    /// The write reaches the file, then the call fails
    AfterWrite,
}

/// Fails the write call with the given zero-based ordinal
#[derive(Debug)]
pub struct CrashAtWrite {
    ordinal: usize,
    phase: CrashPhase,
    calls: usize,
    crashed: bool,
}

impl CrashAtWrite {
    pub fn new(ordinal: usize, phase: CrashPhase) -> Self {
        Self {
            ordinal,
            phase,
            calls: 0,
            crashed: false,
        }
    }

    /// Fail write `ordinal` before it lands
    pub fn before(ordinal: usize) -> Self {
        Self::new(ordinal, CrashPhase::BeforeWrite)
    }

    /// Let write `ordinal` land, then fail it
    pub fn after(ordinal: usize) -> Self {
        Self::new(ordinal, CrashPhase::AfterWrite)
    }

    /// Write calls observed so far
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Whether the crash has fired
    pub fn crashed(&self) -> bool {
        self.crashed
    }

    fn simulated_crash(&mut self) -> io::Error {
        self.crashed = true;
        io::Error::other(format!("simulated crash at write call {}", self.ordinal))
    }
}

impl WriteObserver for CrashAtWrite {
    fn before_write(&mut self, _offset: u64, _data: &[u8]) -> io::Result<()> {
        let call = self.calls;
        self.calls += 1;
        if self.crashed {
            return Err(io::Error::other("write after simulated crash"));
        }
        if call == self.ordinal && self.phase == CrashPhase::BeforeWrite {
            return Err(self.simulated_crash());
        }
        Ok(())
    }

    fn after_write(&mut self, _offset: u64, _data: &[u8]) -> io::Result<()> {
        if !self.crashed
            && self.calls == self.ordinal + 1
            && self.phase == CrashPhase::AfterWrite
        {
            return Err(self.simulated_crash());
        }
        Ok(())
    }
}
