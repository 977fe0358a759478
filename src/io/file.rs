use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::ByteSink;
use crate::error::Result;

/// File-backed sink created by truncating the target path.
pub struct FileSink {
    file: File,
    written: u64,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file, written: 0 })
    }
}

impl ByteSink for FileSink {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        // write_all turns a short write into an error, which is what a
        // partially emitted header must be.
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn offset(&self) -> u64 {
        self.written
    }
}
