//! Error types for rwzip.

use thiserror::Error;

/// Main error type for archive operations.
#[derive(Error, Debug)]
pub enum ZipError {
    /// An underlying read, write, or seek failed, or the external
    /// decompressor could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream does not look like a classic 32-bit ZIP archive:
    /// a required signature was missing or a record was truncated.
    #[error("invalid ZIP data: {0}")]
    Format(String),

    /// A read, extract, or add call was made on a session that is closed
    /// or was never opened for that mode.
    #[error("archive session is closed")]
    Closed,

    /// An include/exclude filter was not a valid regular expression.
    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ZipError>;
