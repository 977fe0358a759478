//! # rwzip
//!
//! A reader and writer for the classic 32-bit ZIP archive format.
//!
//! This library parses the end-of-central-directory record, walks central
//! file headers, reconciles them against local headers, and streams entry
//! content to and from disk. Writing assembles a byte-exact archive:
//! local headers + file data + central directory + trailer. DEFLATE is
//! handled through `flate2` as an opaque codec.
//!
//! ## Features
//!
//! - List and extract local ZIP archives, including office-document ZIPs
//!   whose central directories carry zeroed size/CRC fields
//! - Strip leading path segments or a literal prefix during extraction,
//!   with regex include/exclude filters
//! - Create archives on disk or in memory, STORED or DEFLATE
//! - Legacy DOS timestamp handling with the 1980 clamp
//!
//! ## Example
//!
//! ```no_run
//! use rwzip::{Archive, Strip};
//!
//! fn main() -> rwzip::Result<()> {
//!     // Build an archive in memory.
//!     let mut zip = Archive::create("")?;
//!     zip.add_data("docs/readme.txt", b"hello", 0, 6)?;
//!     zip.save("out.zip")?;
//!
//!     // Read it back.
//!     let mut zip = Archive::open("out.zip")?;
//!     for entry in zip.contents()? {
//!         println!("{} ({} bytes)", entry.name, entry.size);
//!     }
//!     zip.extract("out", &Strip::Components(1), None, None)?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use archive::Archive;
pub use cli::Cli;
pub use error::{Result, ZipError};
pub use io::{ByteSink, FileSink, MemorySink, Sink};
pub use zip::{CompressionMethod, EntryInfo, ExtractedEntry, Strip};
