use super::ByteSink;
use crate::error::Result;

/// In-memory sink backing a session created with an empty target path.
#[derive(Default)]
pub struct MemorySink {
    buf: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl ByteSink for MemorySink {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn offset(&self) -> u64 {
        self.buf.len() as u64
    }
}
