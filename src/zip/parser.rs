//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures, reading
//! from any seekable byte source.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) near the file's end
//! 2. Walk the Central Directory to get metadata for all entries
//! 3. For extraction, reconcile each entry against its Local File Header
//!    to fix up fields some producers leave zeroed and to locate the
//!    exact start of the entry's data
//!
//! The decompression stream layered over an entry is strictly
//! forward-only; the archive source itself must seek.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::error::{Result, ZipError};

use super::structures::*;

/// Widest region the EOCD locator will scan: the 22-byte record plus a
/// comment of roughly 255 bytes. Archives carrying a longer comment are a
/// known limitation and fail to locate the trailer.
const MAX_TRAILER_SCAN: u64 = 277;

/// Low-level ZIP file parser.
///
/// Generic over the byte source so sessions can read real files while
/// tests read in-memory cursors.
///
/// ## Example
///
/// ```ignore
/// let mut parser = ZipParser::new(&mut file, len);
/// for mut header in parser.read_entries()? {
///     let data_start = parser.reconcile(&mut header)?;
///     // Read header.compressed_size bytes from data_start...
/// }
/// ```
pub struct ZipParser<R: Read + Seek> {
    /// The underlying seekable byte source
    source: R,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: Read + Seek> ZipParser<R> {
    /// Create a new parser for the given source of `size` bytes.
    pub fn new(source: R, size: u64) -> Self {
        Self { source, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Seeks to `size - min(size, 277)` and scans forward byte-by-byte,
    /// keeping a rolling 32-bit window, until the EOCD signature matches.
    ///
    /// # Returns
    ///
    /// The parsed summary: entry counts, directory size, directory offset,
    /// and the archive comment if one is present.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError::Format`] if no signature is found in the
    /// scanned region, if the fixed fields are truncated, or if the
    /// directory the summary describes would run past end-of-file.
    pub fn read_summary(&mut self) -> Result<CentralDirectorySummary> {
        let max_scan = self.size.min(MAX_TRAILER_SCAN);
        self.source.seek(SeekFrom::Start(self.size - max_scan))?;

        let mut tail = vec![0u8; max_scan as usize];
        self.source.read_exact(&mut tail)?;

        // Rolling window over the tail: after consuming byte i the window
        // holds bytes i-3..=i, so a match means the signature ends at i.
        let mut window = 0u32;
        let mut found = None;
        for (i, &byte) in tail.iter().enumerate() {
            window = (window << 8) | byte as u32;
            if window == EOCD_WINDOW {
                found = Some(i + 1);
                break;
            }
        }

        let fixed_start = found.ok_or_else(|| {
            ZipError::Format("end of central directory signature not found".into())
        })?;

        if tail.len() - fixed_start < EOCD_SIZE - 4 {
            return Err(ZipError::Format(
                "end of central directory record is truncated".into(),
            ));
        }

        let fixed = &tail[fixed_start..fixed_start + (EOCD_SIZE - 4)];
        let mut summary = CentralDirectorySummary::from_fixed_bytes(fixed)?;

        let comment_len = CentralDirectorySummary::comment_len(fixed) as usize;
        if comment_len > 0 {
            let start = fixed_start + (EOCD_SIZE - 4);
            let end = (start + comment_len).min(tail.len());
            summary.comment = String::from_utf8_lossy(&tail[start..end]).to_string();
        }

        if summary.cd_offset as u64 + summary.cd_size as u64 > self.size {
            return Err(ZipError::Format(
                "central directory extends past end of file".into(),
            ));
        }

        Ok(summary)
    }

    /// Read every Central Directory File Header in directory order.
    ///
    /// Reads the summary first, seeks to the directory start, then walks
    /// exactly `total_entries` records.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError::Format`] if any record's signature does not
    /// match or its variable-length fields are truncated.
    pub fn read_entries(&mut self) -> Result<Vec<CentralFileHeader>> {
        let summary = self.read_summary()?;

        self.source
            .seek(SeekFrom::Start(summary.cd_offset as u64))?;

        let mut entries = Vec::with_capacity(summary.total_entries as usize);
        for _ in 0..summary.total_entries {
            entries.push(self.read_central_header()?);
        }

        Ok(entries)
    }

    /// Read one central header at the current source position.
    fn read_central_header(&mut self) -> Result<CentralFileHeader> {
        let mut fixed = [0u8; CDFH_SIZE];
        self.source.read_exact(&mut fixed)?;

        // Variable-field lengths sit at fixed offsets 28..34.
        let mut cursor = Cursor::new(&fixed[28..34]);
        let name_len = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_len = cursor.read_u16::<LittleEndian>()? as usize;
        let comment_len = cursor.read_u16::<LittleEndian>()? as usize;

        let mut variable = vec![0u8; name_len + extra_len + comment_len];
        self.source.read_exact(&mut variable)?;

        CentralFileHeader::from_bytes(&fixed, &variable)
    }

    /// Reconcile a central header against its Local File Header.
    ///
    /// Seeks to the entry's recorded local-header offset, validates the
    /// signature, and merges fields: `size`, `compressed_size`, and `crc`
    /// are overwritten from the local copy only when the local value is
    /// nonzero. Some producers (office-document writers among them) zero
    /// these in the central directory; others legitimately zero them in
    /// streamed local headers, so the precedence is exactly one-way.
    ///
    /// # Returns
    ///
    /// The byte offset where the entry's data begins. Every downstream
    /// read must start here, because the local extra field's length is not
    /// recoverable from the central directory.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError::Format`] if the local header signature does not
    /// match.
    pub fn reconcile(&mut self, header: &mut CentralFileHeader) -> Result<u64> {
        self.source
            .seek(SeekFrom::Start(header.lfh_offset as u64))?;

        let mut lfh = [0u8; LFH_SIZE];
        self.source.read_exact(&mut lfh)?;

        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(ZipError::Format("invalid local file header".into()));
        }

        let mut cursor = Cursor::new(&lfh[14..]);
        let local_crc = cursor.read_u32::<LittleEndian>()?;
        let local_compressed = cursor.read_u32::<LittleEndian>()?;
        let local_uncompressed = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_len = cursor.read_u16::<LittleEndian>()? as u64;

        if local_crc != 0 {
            header.crc32 = local_crc;
        }
        if local_compressed != 0 {
            header.compressed_size = local_compressed;
        }
        if local_uncompressed != 0 {
            header.uncompressed_size = local_uncompressed;
        }
        header.folder = header.folder || header.stored_name.ends_with('/');

        Ok(header.lfh_offset as u64 + LFH_SIZE as u64 + name_len + extra_len)
    }

    /// Consume the parser, returning the underlying source.
    pub fn into_source(self) -> R {
        self.source
    }

    /// Mutable access to the underlying source, for reading entry data
    /// after [`reconcile`](Self::reconcile) has positioned everything.
    pub fn source_mut(&mut self) -> &mut R {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn eocd(entries: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"PK\x05\x06");
        buf.write_u16::<LittleEndian>(0).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap();
        buf.write_u16::<LittleEndian>(entries).unwrap();
        buf.write_u16::<LittleEndian>(entries).unwrap();
        buf.write_u32::<LittleEndian>(cd_size).unwrap();
        buf.write_u32::<LittleEndian>(cd_offset).unwrap();
        buf.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
        buf.extend_from_slice(comment);
        buf
    }

    fn parse(bytes: Vec<u8>) -> Result<CentralDirectorySummary> {
        let size = bytes.len() as u64;
        ZipParser::new(Cursor::new(bytes), size).read_summary()
    }

    #[test]
    fn summary_without_comment() {
        let summary = parse(eocd(3, 0, 0, b"")).unwrap();
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.cd_size, 0);
        assert_eq!(summary.cd_offset, 0);
        assert_eq!(summary.comment, "");
    }

    #[test]
    fn summary_with_comment() {
        let summary = parse(eocd(1, 0, 0, b"made by tests")).unwrap();
        assert_eq!(summary.comment, "made by tests");
    }

    #[test]
    fn summary_after_leading_data() {
        // Entry data before the trailer, as in any real archive.
        let mut bytes = vec![0xAA; 64];
        bytes.extend_from_slice(&eocd(1, 10, 54, b""));
        let summary = parse(bytes).unwrap();
        assert_eq!(summary.cd_offset, 54);
    }

    #[test]
    fn short_file_is_format_error() {
        let err = parse(b"PK".to_vec()).unwrap_err();
        assert!(matches!(err, ZipError::Format(_)));
    }

    #[test]
    fn garbage_is_format_error() {
        let err = parse(vec![0x42; 300]).unwrap_err();
        assert!(matches!(err, ZipError::Format(_)));
    }

    #[test]
    fn directory_past_eof_is_format_error() {
        let err = parse(eocd(1, 500, 0, b"")).unwrap_err();
        assert!(matches!(err, ZipError::Format(_)));
    }

    #[test]
    fn truncated_fixed_fields_are_format_error() {
        // Signature present but only half the fixed record behind it.
        let mut bytes = eocd(1, 0, 0, b"");
        bytes.truncate(12);
        let err = parse(bytes).unwrap_err();
        assert!(matches!(err, ZipError::Format(_)));
    }
}
