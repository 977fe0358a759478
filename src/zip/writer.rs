//! Archive writer.
//!
//! Emits the classic 32-bit ZIP layout: a local header and payload for
//! each added entry, followed at close by the central directory and the
//! end-of-central-directory trailer. Entry sizes and CRCs are known
//! before the payload is written, so headers carry real values and the
//! descriptor block after the payload is a plain duplication (no
//! general-purpose flag bit is set).

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use std::io::Write;

use crate::error::Result;
use crate::io::{ByteSink, Sink};
use crate::zip::structures::{CDFH_SIGNATURE, LFH_SIGNATURE};
use crate::zip::{dostime, paths};

/// Version-needed words: 20 for DEFLATE entries, 10 for stored ones.
const VERSION_DEFLATE: u16 = 20;
const VERSION_STORED: u16 = 10;

/// External-attributes word recorded for every written entry (archive
/// bit, the value classic producers emit).
const EXTERNAL_ATTRS: u32 = 32;

/// Write-mode half of an archive session.
///
/// Owns the output sink and the pending central-directory records that
/// [`finish`](Self::finish) appends.
pub struct ZipWriter {
    sink: Sink,
    /// One encoded central record per added entry, written at finish.
    central: Vec<Vec<u8>>,
    finished: bool,
}

impl ZipWriter {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            central: Vec::new(),
            finished: false,
        }
    }

    /// Add one entry from in-memory bytes.
    ///
    /// The stored name is sanitized first; a zero `mtime` means "now".
    /// A nonzero `level` compresses with raw DEFLATE at that level,
    /// `level == 0` stores the bytes verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError::Io`](crate::ZipError::Io) if the sink or the
    /// compressor fails.
    pub fn add_entry(&mut self, stored_name: &str, data: &[u8], mtime: i64, level: u32) -> Result<()> {
        let name = paths::clean(stored_name);
        let mtime = if mtime == 0 {
            chrono::Utc::now().timestamp()
        } else {
            mtime
        };
        let dos = dostime::encode(mtime);

        // CRC and size are taken from the raw bytes before compression.
        let mut crc = Crc::new();
        crc.update(data);
        let crc32 = crc.sum();
        let uncompressed_size = data.len() as u32;

        let (payload, method, version) = if level > 0 {
            let mut encoder =
                DeflateEncoder::new(Vec::new(), Compression::new(level.min(9)));
            encoder.write_all(data)?;
            (encoder.finish()?, 8u16, VERSION_DEFLATE)
        } else {
            (data.to_vec(), 0u16, VERSION_STORED)
        };
        let compressed_size = payload.len() as u32;

        // The offset recorded in the central directory is where this
        // entry's local header starts, not where its data starts.
        let lfh_offset = self.sink.offset() as u32;

        let mut local = Vec::with_capacity(42 + name.len() + payload.len());
        local.extend_from_slice(LFH_SIGNATURE);
        local.write_u16::<LittleEndian>(version)?;
        local.write_u16::<LittleEndian>(0)?; // general-purpose flags
        local.write_u16::<LittleEndian>(method)?;
        local.write_u32::<LittleEndian>(dos)?;
        local.write_u32::<LittleEndian>(crc32)?;
        local.write_u32::<LittleEndian>(compressed_size)?;
        local.write_u32::<LittleEndian>(uncompressed_size)?;
        local.write_u16::<LittleEndian>(name.len() as u16)?;
        local.write_u16::<LittleEndian>(0)?; // extra field length
        local.extend_from_slice(name.as_bytes());
        local.extend_from_slice(&payload);
        // Descriptor-style duplication after the payload.
        local.write_u32::<LittleEndian>(crc32)?;
        local.write_u32::<LittleEndian>(compressed_size)?;
        local.write_u32::<LittleEndian>(uncompressed_size)?;

        self.sink.write_bytes(&local)?;

        let mut record = Vec::with_capacity(46 + name.len());
        record.extend_from_slice(CDFH_SIGNATURE);
        record.write_u16::<LittleEndian>(0)?; // version made by
        record.write_u16::<LittleEndian>(version)?;
        record.write_u16::<LittleEndian>(0)?; // general-purpose flags
        record.write_u16::<LittleEndian>(method)?;
        record.write_u32::<LittleEndian>(dos)?;
        record.write_u32::<LittleEndian>(crc32)?;
        record.write_u32::<LittleEndian>(compressed_size)?;
        record.write_u32::<LittleEndian>(uncompressed_size)?;
        record.write_u16::<LittleEndian>(name.len() as u16)?;
        record.write_u16::<LittleEndian>(0)?; // extra field length
        record.write_u16::<LittleEndian>(0)?; // comment length
        record.write_u16::<LittleEndian>(0)?; // disk number start
        record.write_u16::<LittleEndian>(0)?; // internal attributes
        record.write_u32::<LittleEndian>(EXTERNAL_ATTRS)?;
        record.write_u32::<LittleEndian>(lfh_offset)?;
        record.extend_from_slice(name.as_bytes());

        self.central.push(record);
        Ok(())
    }

    /// Append the central directory and the end-of-central-directory
    /// trailer. Idempotent: a second call writes nothing.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        let cd_offset = self.sink.offset() as u32;
        let mut cd_size = 0u32;
        for record in &self.central {
            cd_size += record.len() as u32;
            self.sink.write_bytes(record)?;
        }

        let count = self.central.len() as u16;
        let mut trailer = Vec::with_capacity(22);
        trailer.extend_from_slice(b"PK\x05\x06");
        trailer.write_u16::<LittleEndian>(0)?; // this disk
        trailer.write_u16::<LittleEndian>(0)?; // disk with central directory
        trailer.write_u16::<LittleEndian>(count)?;
        trailer.write_u16::<LittleEndian>(count)?;
        trailer.write_u32::<LittleEndian>(cd_size)?;
        trailer.write_u32::<LittleEndian>(cd_offset)?;
        trailer.write_u16::<LittleEndian>(0)?; // comment length
        self.sink.write_bytes(&trailer)?;

        self.central.clear();
        self.finished = true;
        Ok(())
    }

    /// Accumulated bytes, for memory-backed sessions.
    pub fn memory(&self) -> Option<&[u8]> {
        self.sink.memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemorySink;

    fn memory_writer() -> ZipWriter {
        ZipWriter::new(Sink::Memory(MemorySink::new()))
    }

    #[test]
    fn empty_archive_is_a_bare_trailer() {
        let mut writer = memory_writer();
        writer.finish().unwrap();
        let bytes = writer.memory().unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[0..4], b"PK\x05\x06");
    }

    #[test]
    fn finish_twice_writes_one_trailer() {
        let mut writer = memory_writer();
        writer.add_entry("a.txt", b"hello", 0, 0).unwrap();
        writer.finish().unwrap();
        let len = writer.memory().unwrap().len();
        writer.finish().unwrap();
        assert_eq!(writer.memory().unwrap().len(), len);
    }

    #[test]
    fn stored_entry_layout() {
        let mut writer = memory_writer();
        writer.add_entry("a.txt", b"hello", 0, 0).unwrap();
        writer.finish().unwrap();
        let bytes = writer.memory().unwrap();

        // Local header at offset 0, stored method, real sizes.
        assert_eq!(&bytes[0..4], b"PK\x03\x04");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), VERSION_STORED);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 0);
        assert_eq!(u32::from_le_bytes(bytes[18..22].try_into().unwrap()), 5);
        assert_eq!(u32::from_le_bytes(bytes[22..26].try_into().unwrap()), 5);
        // Payload follows the 30-byte header and 5-byte name.
        assert_eq!(&bytes[35..40], b"hello");
        // Central record points back at offset 0.
        let cd = 30 + 5 + 5 + 12;
        assert_eq!(&bytes[cd..cd + 4], b"PK\x01\x02");
        assert_eq!(
            u32::from_le_bytes(bytes[cd + 42..cd + 46].try_into().unwrap()),
            0
        );
    }

    #[test]
    fn names_are_sanitized_before_storage() {
        let mut writer = memory_writer();
        writer.add_entry("../evil/../a.txt", b"x", 0, 0).unwrap();
        writer.finish().unwrap();
        let bytes = writer.memory().unwrap();
        let name_len = u16::from_le_bytes([bytes[26], bytes[27]]) as usize;
        assert_eq!(&bytes[30..30 + name_len], b"a.txt");
    }
}
