//! Byte sinks for archive output.
//!
//! A write-mode session emits bytes through a [`ByteSink`]: either a file
//! on disk or a growable in-memory buffer, chosen at session creation.
//! The sink tracks its own offset so the writer can record where each
//! local header lands without a separate seek.

mod file;
mod memory;

pub use file::FileSink;
pub use memory::MemorySink;

use crate::error::Result;

/// Capability interface for archive output.
pub trait ByteSink {
    /// Write the whole buffer, returning the number of bytes written.
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize>;

    /// Current write offset from the start of the archive.
    fn offset(&self) -> u64;
}

/// The two sink implementations a session can own.
pub enum Sink {
    File(FileSink),
    Memory(MemorySink),
}

impl Sink {
    /// Returns the accumulated buffer for memory-backed sinks.
    pub fn memory(&self) -> Option<&[u8]> {
        match self {
            Sink::Memory(m) => Some(m.bytes()),
            Sink::File(_) => None,
        }
    }
}

impl ByteSink for Sink {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            Sink::File(s) => s.write_bytes(buf),
            Sink::Memory(s) => s.write_bytes(buf),
        }
    }

    fn offset(&self) -> u64 {
        match self {
            Sink::File(s) => s.offset(),
            Sink::Memory(s) => s.offset(),
        }
    }
}
