//! Extraction engine.
//!
//! Walks the central directory, reconciles each entry against its local
//! header, applies path stripping and include/exclude filters, and
//! streams entry bytes to disk. DEFLATE entries take a detour: the raw
//! compressed bytes are wrapped in a minimal synthetic gzip container in
//! a temporary `.gz` file, then pushed through the external gzip decoder
//! into the final path. The temp file never outlives its entry, on
//! success or failure.

use flate2::read::GzDecoder;
use regex::Regex;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use crate::error::Result;

use super::parser::ZipParser;
use super::paths;
use super::structures::{CentralFileHeader, CompressionMethod, EntryInfo, ExtractedEntry};

/// Upper bound on a single copy chunk. Keeps memory flat regardless of
/// entry size; the loops below still drain exact byte counts.
const COPY_CHUNK: usize = 2048;

/// How leading path material is removed from entry names before they are
/// joined to the extraction directory.
#[derive(Debug, Clone, Default)]
pub enum Strip {
    /// Keep names as stored (after sanitizing).
    #[default]
    None,
    /// Drop the first N path segments, always keeping the final filename
    /// segment.
    Components(usize),
    /// Remove an exact literal prefix; names not starting with it pass
    /// through unchanged.
    Prefix(String),
}

impl Strip {
    fn apply(&self, name: &str) -> String {
        match self {
            Strip::None => name.to_string(),
            Strip::Components(n) => paths::strip_components(name, *n),
            Strip::Prefix(prefix) => {
                name.strip_prefix(prefix.as_str()).unwrap_or(name).to_string()
            }
        }
    }
}

/// ZIP file extractor over a seekable byte source.
pub struct ZipExtractor<R: Read + Seek> {
    parser: ZipParser<R>,
}

impl<R: Read + Seek> ZipExtractor<R> {
    pub fn new(source: R, size: u64) -> Self {
        Self {
            parser: ZipParser::new(source, size),
        }
    }

    /// List all entries with central and local headers reconciled, so
    /// sizes and CRCs are real even for producers that zero them in the
    /// central directory.
    pub fn list(&mut self) -> Result<Vec<EntryInfo>> {
        let entries = self.parser.read_entries()?;

        let mut infos = Vec::with_capacity(entries.len());
        for (index, mut header) in entries.into_iter().enumerate() {
            self.parser.reconcile(&mut header)?;
            infos.push(EntryInfo::from_header(&header, index));
        }

        Ok(infos)
    }

    /// Extract the archive into `out_dir`.
    ///
    /// Entries are processed in central-directory order. Each stored name
    /// is sanitized, stripped, then filtered: an include pattern (when
    /// given) must match, an exclude pattern (when given) must not, and a
    /// name stripped down to nothing is always dropped. Directory entries
    /// are created without a data copy; file entries are streamed in
    /// bounded chunks and stamped with the entry's modification time.
    ///
    /// Filters arrive pre-compiled so callers can validate them before
    /// committing to a forward-only pass over the source.
    ///
    /// # Errors
    ///
    /// The first failing entry aborts the whole call; there is no
    /// partial-archive continuation.
    pub fn extract(
        &mut self,
        out_dir: &Path,
        strip: &Strip,
        exclude: Option<&Regex>,
        include: Option<&Regex>,
    ) -> Result<Vec<ExtractedEntry>> {
        let entries = self.parser.read_entries()?;
        let mut extracted = Vec::new();

        for (index, mut header) in entries.into_iter().enumerate() {
            let data_start = self.parser.reconcile(&mut header)?;

            let name = strip.apply(&paths::clean(&header.stored_name));
            if name.is_empty() {
                continue;
            }
            if include.is_some_and(|re| !re.is_match(&name)) {
                continue;
            }
            if exclude.is_some_and(|re| re.is_match(&name)) {
                continue;
            }

            let dest = out_dir.join(&name);
            let entry = EntryInfo::from_header(&header, index);

            if header.folder {
                fs::create_dir_all(&dest)?;
                extracted.push(ExtractedEntry { path: name, entry, index });
                continue;
            }

            if let Some(parent) = dest.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            match header.method {
                CompressionMethod::Stored => self.copy_stored(data_start, &header, &dest)?,
                _ => self.inflate_through_bridge(data_start, &header, &dest)?,
            }

            extracted.push(ExtractedEntry { path: name, entry, index });
        }

        Ok(extracted)
    }

    /// Copy a stored (method 0) entry's bytes straight to `dest`.
    fn copy_stored(&mut self, data_start: u64, header: &CentralFileHeader, dest: &Path) -> Result<()> {
        let source = self.parser.source_mut();
        source.seek(SeekFrom::Start(data_start))?;

        let mut out = File::create(dest)?;
        copy_exact(source, &mut out, header.compressed_size as u64)?;
        set_mtime(&out, header.mtime)?;
        Ok(())
    }

    /// Decompress a DEFLATE entry via a temporary gzip container.
    ///
    /// The archive holds raw DEFLATE bytes with no framing, so a minimal
    /// gzip header and (CRC, size) trailer are synthesized around them in
    /// a `<dest>.gz` temp file, which the gzip decoder then streams into
    /// the final path. The temp file is removed on every exit path.
    fn inflate_through_bridge(
        &mut self,
        data_start: u64,
        header: &CentralFileHeader,
        dest: &Path,
    ) -> Result<()> {
        let mut gz_name = dest.as_os_str().to_os_string();
        gz_name.push(".gz");
        let gz_path = PathBuf::from(gz_name);

        let outcome = self.write_bridge(data_start, header, &gz_path).and_then(|_| {
            let mut decoder = GzDecoder::new(File::open(&gz_path)?);
            let mut out = File::create(dest)?;
            let mut chunk = [0u8; COPY_CHUNK];
            loop {
                let n = decoder.read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                out.write_all(&chunk[..n])?;
            }
            set_mtime(&out, header.mtime)?;
            Ok(())
        });

        // Best-effort cleanup before surfacing any failure.
        let _ = fs::remove_file(&gz_path);
        outcome
    }

    /// Write the synthetic gzip container: 10-byte header, raw DEFLATE
    /// bytes, 8-byte (CRC-32, uncompressed size) trailer.
    fn write_bridge(&mut self, data_start: u64, header: &CentralFileHeader, gz_path: &Path) -> Result<()> {
        let mut gz = File::create(gz_path)?;

        let mut head = [0u8; 10];
        head[0] = 0x1f;
        head[1] = 0x8b;
        head[2] = 8; // DEFLATE
        head[3] = 0; // no flags
        let now = chrono::Utc::now().timestamp().max(0) as u32;
        head[4..8].copy_from_slice(&now.to_le_bytes());
        head[8] = 0; // no extra flags
        head[9] = 3; // OS: unix
        gz.write_all(&head)?;

        let source = self.parser.source_mut();
        source.seek(SeekFrom::Start(data_start))?;
        copy_exact(source, &mut gz, header.compressed_size as u64)?;

        gz.write_all(&header.crc32.to_le_bytes())?;
        gz.write_all(&header.uncompressed_size.to_le_bytes())?;
        Ok(())
    }
}

/// Copy exactly `len` bytes in bounded chunks.
fn copy_exact<R: Read, W: Write>(src: &mut R, dst: &mut W, len: u64) -> Result<()> {
    let mut remaining = len;
    let mut chunk = [0u8; COPY_CHUNK];

    while remaining > 0 {
        let want = remaining.min(COPY_CHUNK as u64) as usize;
        src.read_exact(&mut chunk[..want])?;
        dst.write_all(&chunk[..want])?;
        remaining -= want as u64;
    }

    Ok(())
}

fn set_mtime(file: &File, mtime: i64) -> Result<()> {
    let stamp = UNIX_EPOCH + Duration::from_secs(mtime.max(0) as u64);
    file.set_modified(stamp)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_variants() {
        assert_eq!(Strip::None.apply("a/b/c.txt"), "a/b/c.txt");
        assert_eq!(Strip::Components(1).apply("a/b/c.txt"), "b/c.txt");
        assert_eq!(Strip::Components(2).apply("a/b/c.txt"), "c.txt");
        assert_eq!(
            Strip::Prefix("a/".to_string()).apply("a/b/c.txt"),
            "b/c.txt"
        );
        // A non-matching prefix leaves the name alone.
        assert_eq!(
            Strip::Prefix("z/".to_string()).apply("a/b/c.txt"),
            "a/b/c.txt"
        );
    }

    #[test]
    fn copy_exact_drains_the_requested_length() {
        let data = vec![7u8; 5000];
        let mut src = std::io::Cursor::new(&data);
        let mut dst = Vec::new();
        copy_exact(&mut src, &mut dst, 4097).unwrap();
        assert_eq!(dst.len(), 4097);
        assert_eq!(src.position(), 4097);
    }

    #[test]
    fn copy_exact_fails_on_truncated_source() {
        let data = vec![7u8; 10];
        let mut src = std::io::Cursor::new(&data);
        let mut dst = Vec::new();
        assert!(copy_exact(&mut src, &mut dst, 11).is_err());
    }
}
