use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Result, ZipError};
use crate::zip::dostime;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// Local File Header (LFH) - 30 bytes fixed
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Central Directory File Header (CDFH) - 46 bytes fixed
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_SIZE: usize = 46;

/// End of Central Directory (EOCD) - 22 bytes minimum
pub const EOCD_SIZE: usize = 22;

/// EOCD signature as a big-endian rolling-window value: the byte sequence
/// `50 4b 05 06` accumulated most-significant-first while scanning forward.
pub const EOCD_WINDOW: u32 = 0x504b_0506;

/// External-attribute words that mark an entry as a directory.
const FOLDER_ATTR_MSDOS: u32 = 16;
const FOLDER_ATTR_UNIX: u32 = 0x41FF_0010;

/// End of Central Directory summary record.
///
/// One per archive; bounds the central-header read loop and locates the
/// first central record.
#[derive(Debug, Clone)]
pub struct CentralDirectorySummary {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment: String,
}

impl CentralDirectorySummary {
    /// Parse the fixed EOCD fields that follow the 4-byte signature.
    ///
    /// `data` must hold at least the 18 fixed bytes; the comment is read
    /// separately by the locator because it may run to end-of-file.
    pub fn from_fixed_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < EOCD_SIZE - 4 {
            return Err(ZipError::Format(
                "end of central directory record is truncated".into(),
            ));
        }

        let mut cursor = Cursor::new(data);
        let _disk_number = cursor.read_u16::<LittleEndian>()?;
        let _disk_with_cd = cursor.read_u16::<LittleEndian>()?;
        let disk_entries = cursor.read_u16::<LittleEndian>()?;
        let total_entries = cursor.read_u16::<LittleEndian>()?;
        let cd_size = cursor.read_u32::<LittleEndian>()?;
        let cd_offset = cursor.read_u32::<LittleEndian>()?;
        let _comment_len = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            disk_entries,
            total_entries,
            cd_size,
            cd_offset,
            comment: String::new(),
        })
    }

    pub fn comment_len(data: &[u8]) -> u16 {
        u16::from_le_bytes([data[16], data[17]])
    }
}

/// One central directory file header, merged with its local header by
/// [`ZipParser::reconcile`](crate::zip::ZipParser::reconcile).
#[derive(Debug, Clone)]
pub struct CentralFileHeader {
    /// Stored filename, raw as written by the producer (not sanitized).
    pub stored_name: String,
    pub method: CompressionMethod,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub crc32: u32,
    /// Packed DOS time (low 16 bits) and date (high 16 bits).
    pub dos_timestamp: u32,
    /// Decoded entry modification time (UNIX seconds).
    pub mtime: i64,
    pub external_attrs: u32,
    pub lfh_offset: u32,
    pub extra: Vec<u8>,
    pub comment: String,
    pub folder: bool,
}

impl CentralFileHeader {
    /// Parse a 46-byte fixed central record plus its trailing
    /// variable-length fields laid out after it in `variable`.
    pub fn from_bytes(fixed: &[u8], variable: &[u8]) -> Result<Self> {
        if fixed.len() < CDFH_SIZE || &fixed[0..4] != CDFH_SIGNATURE {
            return Err(ZipError::Format(
                "invalid central directory file header".into(),
            ));
        }

        let mut cursor = Cursor::new(&fixed[4..]);
        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let _flags = cursor.read_u16::<LittleEndian>()?;
        let method = cursor.read_u16::<LittleEndian>()?;
        let mod_time = cursor.read_u16::<LittleEndian>()?;
        let mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_len = cursor.read_u16::<LittleEndian>()? as usize;
        let comment_len = cursor.read_u16::<LittleEndian>()? as usize;
        let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let external_attrs = cursor.read_u32::<LittleEndian>()?;
        let lfh_offset = cursor.read_u32::<LittleEndian>()?;

        if variable.len() < name_len + extra_len + comment_len {
            return Err(ZipError::Format(
                "central header variable fields are truncated".into(),
            ));
        }

        // Order is fixed by the format: filename, extra, comment.
        let stored_name = String::from_utf8_lossy(&variable[..name_len]).to_string();
        let extra = variable[name_len..name_len + extra_len].to_vec();
        let comment =
            String::from_utf8_lossy(&variable[name_len + extra_len..name_len + extra_len + comment_len])
                .to_string();

        let dos_timestamp = ((mod_date as u32) << 16) | mod_time as u32;
        let folder = external_attrs == FOLDER_ATTR_UNIX
            || external_attrs == FOLDER_ATTR_MSDOS
            || stored_name.ends_with('/');

        Ok(Self {
            stored_name,
            method: CompressionMethod::from_u16(method),
            compressed_size,
            uncompressed_size,
            crc32,
            dos_timestamp,
            mtime: dostime::decode(dos_timestamp),
            external_attrs,
            lfh_offset,
            extra,
            comment,
            folder,
        })
    }
}

/// Entry metadata record returned by
/// [`Archive::contents`](crate::Archive::contents).
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Sanitized archive-relative name.
    pub name: String,
    /// Filename exactly as stored in the central directory.
    pub stored_name: String,
    pub size: u32,
    pub compressed_size: u32,
    /// CRC-32 as uppercase hex, zero-padded to 8 digits.
    pub crc: String,
    pub mtime: i64,
    pub comment: String,
    pub folder: bool,
    /// Position in central-directory order, starting at 0.
    pub index: usize,
    pub status: &'static str,
}

impl EntryInfo {
    pub fn from_header(header: &CentralFileHeader, index: usize) -> Self {
        Self {
            name: crate::zip::paths::clean(&header.stored_name),
            stored_name: header.stored_name.clone(),
            size: header.uncompressed_size,
            compressed_size: header.compressed_size,
            crc: format!("{:08X}", header.crc32),
            mtime: header.mtime,
            comment: header.comment.clone(),
            folder: header.folder,
            index,
            status: "ok",
        }
    }
}

/// Descriptor emitted for every entry an extraction actually produced.
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    /// Final on-disk path, relative to the extraction directory.
    pub path: String,
    pub entry: EntryInfo,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_method_round_trips() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(
            CompressionMethod::from_u16(12),
            CompressionMethod::Unknown(12)
        );
        assert_eq!(CompressionMethod::Unknown(12).as_u16(), 12);
    }

    #[test]
    fn truncated_eocd_is_rejected() {
        assert!(CentralDirectorySummary::from_fixed_bytes(&[0u8; 10]).is_err());
    }
}
