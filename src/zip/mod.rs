//! ZIP container parsing and assembly.
//!
//! This module implements the classic 32-bit ZIP layout end to end.
//!
//! ## Architecture
//!
//! - [`structures`]: data structures for the format's records (EOCD,
//!   central and local file headers) and the metadata types the public
//!   API returns
//! - [`parser`]: low-level parsing: EOCD location, central-directory
//!   walking, central-vs-local header reconciliation
//! - [`extractor`]: streaming extraction with strip/filter handling and
//!   the gzip bridge for DEFLATE entries
//! - [`writer`]: archive assembly: local headers, payloads, central
//!   directory, trailer
//! - [`dostime`], [`paths`]: leaf codecs for DOS timestamps and
//!   archive-relative paths
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Reading starts from the EOCD at the file's tail, then jumps to the
//! Central Directory; each entry's Local File Header is consulted only to
//! fix up zeroed fields and to find where its data actually starts.
//!
//! ## Supported Features
//!
//! - Standard 32-bit ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - STORED (no compression) and DEFLATE methods
//! - Legacy DOS timestamps, archive and entry comments
//!
//! ## Limitations
//!
//! - No ZIP64 extensions
//! - No encryption support
//! - No multi-disk archive support
//! - Archive comments longer than ~255 bytes defeat the trailer scan

pub mod dostime;
mod extractor;
mod parser;
pub mod paths;
mod structures;
mod writer;

pub use extractor::{Strip, ZipExtractor};
pub use parser::ZipParser;
pub use structures::*;
pub use writer::ZipWriter;
