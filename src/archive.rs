//! Archive sessions.
//!
//! An [`Archive`] is the top-level handle over one ZIP file: open it for
//! reading (list and extract) or create it for writing (add entries, then
//! close to emit the central directory and trailer). A session owns its
//! file handle or memory buffer exclusively; operations are synchronous
//! and blocking throughout.

use regex::Regex;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, ZipError};
use crate::io::{FileSink, MemorySink, Sink};
use crate::zip::{EntryInfo, ExtractedEntry, Strip, ZipExtractor, ZipWriter};

/// One read- or write-mode session over a ZIP archive.
///
/// ## Lifecycle
///
/// Created by [`open`](Self::open) or [`create`](Self::create), mutated
/// by entry operations, terminated by [`close`](Self::close) (idempotent;
/// in write mode it appends the central directory and trailer first). A
/// read session also closes itself after [`extract`](Self::extract)
/// completes; reopening means calling `open` again.
pub struct Archive {
    closed: bool,
    write_access: bool,
    /// Read mode: the open archive file and its length.
    reader: Option<(File, u64)>,
    /// Write mode: sink plus pending central-directory records.
    writer: Option<ZipWriter>,
}

impl Archive {
    /// Open an existing archive for reading.
    ///
    /// # Errors
    ///
    /// Returns [`ZipError::Io`] if the file cannot be opened. The archive
    /// structure itself is not validated until the first read operation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();

        Ok(Self {
            closed: false,
            write_access: false,
            reader: Some((file, size)),
            writer: None,
        })
    }

    /// Create a new archive for writing.
    ///
    /// An empty `path` backs the session with an in-memory buffer, later
    /// retrieved through [`get_archive`](Self::get_archive) or
    /// [`save`](Self::save); otherwise the file at `path` is created or
    /// truncated.
    pub fn create(path: &str) -> Result<Self> {
        let sink = if path.is_empty() {
            Sink::Memory(MemorySink::new())
        } else {
            Sink::File(FileSink::create(Path::new(path))?)
        };

        Ok(Self {
            closed: false,
            write_access: true,
            reader: None,
            writer: Some(ZipWriter::new(sink)),
        })
    }

    /// List the archive's entries in central-directory order.
    ///
    /// Sizes and CRCs are reconciled against each entry's local header,
    /// so producers that zero those fields in the central directory still
    /// report real values here.
    pub fn contents(&mut self) -> Result<Vec<EntryInfo>> {
        let (file, size) = self.read_handle()?;
        ZipExtractor::new(file, size).list()
    }

    /// Extract the archive into `out_dir`, applying path stripping and
    /// optional exclude/include regex filters.
    ///
    /// The session is closed once the entry loop completes, even when
    /// every entry was filtered out; one entry's failure aborts the whole
    /// call. A bad filter pattern fails before the pass starts and leaves
    /// the session open, so the caller can retry with a corrected one.
    pub fn extract(
        &mut self,
        out_dir: impl AsRef<Path>,
        strip: &Strip,
        exclude: Option<&str>,
        include: Option<&str>,
    ) -> Result<Vec<ExtractedEntry>> {
        if self.closed || self.reader.is_none() {
            return Err(ZipError::Closed);
        }

        let exclude_re = exclude.map(Regex::new).transpose()?;
        let include_re = include.map(Regex::new).transpose()?;

        let (file, size) = self.read_handle()?;
        let result = ZipExtractor::new(file, size).extract(
            out_dir.as_ref(),
            strip,
            exclude_re.as_ref(),
            include_re.as_ref(),
        );

        // Read-mode teardown: the source may not be rewindable, so the
        // session ends with the extraction pass.
        self.reader = None;
        self.closed = true;

        result
    }

    /// Add a file from disk under the stored name `name` (the file's own
    /// name if empty), carrying over its modification time.
    pub fn add_file(&mut self, path: impl AsRef<Path>, name: &str, level: u32) -> Result<()> {
        let path = path.as_ref();
        let data = fs::read(path)?;

        let mtime = fs::metadata(path)?
            .modified()?
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let name = if name.is_empty() {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        } else {
            name.to_string()
        };

        self.add_data(&name, &data, mtime, level)
    }

    /// Add an entry from in-memory bytes. A zero `mtime` means "now"; a
    /// zero `level` stores the bytes without compression.
    pub fn add_data(&mut self, name: &str, data: &[u8], mtime: i64, level: u32) -> Result<()> {
        if self.closed {
            return Err(ZipError::Closed);
        }
        let writer = self.writer.as_mut().ok_or(ZipError::Closed)?;
        writer.add_entry(name, data, mtime, level)
    }

    /// Close the session. In write mode this appends the central
    /// directory and end-of-central-directory trailer. Calling `close` on
    /// an already-closed session is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if let Some(writer) = self.writer.as_mut() {
            writer.finish()?;
        }

        self.reader = None;
        self.closed = true;
        Ok(())
    }

    /// Finalize and return the archive bytes of a memory-backed write
    /// session. Forces [`close`](Self::close).
    pub fn get_archive(&mut self) -> Result<Vec<u8>> {
        self.close()?;

        self.writer
            .as_ref()
            .and_then(|w| w.memory())
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                ZipError::Io(std::io::Error::new(
                    ErrorKind::Unsupported,
                    "archive session is not memory-backed",
                ))
            })
    }

    /// Materialize a memory-backed archive to disk.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.get_archive()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Whether this session was created for writing.
    pub fn write_access(&self) -> bool {
        self.write_access
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn read_handle(&mut self) -> Result<(&mut File, u64)> {
        if self.closed {
            return Err(ZipError::Closed);
        }
        match self.reader.as_mut() {
            Some((file, size)) => Ok((file, *size)),
            None => Err(ZipError::Closed),
        }
    }
}
