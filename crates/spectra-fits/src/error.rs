//! Error types for FITS file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or writing FITS files.
#[derive(Debug, Error)]
pub enum FitsError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid FITS structure.
    #[error("invalid FITS file: {message}")]
    InvalidFormat { message: String },

    /// A mandatory keyword is absent from a header.
    #[error("missing keyword {keyword} in HDU {hdu}")]
    MissingKeyword { keyword: String, hdu: usize },

    /// A keyword holds a value of the wrong type or range.
    #[error("invalid value for keyword {keyword}: {value}")]
    InvalidKeyword { keyword: String, value: String },

    /// No HDU carries the requested extension name.
    #[error("no HDU named {name}")]
    HduNotFound { name: String },

    /// The named HDU exists but does not hold image data.
    #[error("HDU {name} is a {kind} extension, expected an image")]
    UnsupportedHdu { name: String, kind: String },

    /// BITPIX value outside the standard set.
    #[error("unsupported BITPIX {0}")]
    UnsupportedBitpix(i64),

    /// The file ended inside a header or data unit.
    #[error("file truncated at byte offset {offset}")]
    Truncated { offset: u64 },

    /// Data unit size does not fit in memory addressing.
    #[error("data unit size overflow")]
    DataOverflow,

    /// Axis lengths do not multiply out to the number of values supplied.
    #[error("image {name} has {actual} values but its axes describe {expected}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FITS operations.
pub type Result<T> = std::result::Result<T, FitsError>;

impl FitsError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a MissingKeyword error.
    pub fn missing_keyword(keyword: impl Into<String>, hdu: usize) -> Self {
        Self::MissingKeyword {
            keyword: keyword.into(),
            hdu,
        }
    }

    /// Create an InvalidKeyword error.
    pub fn invalid_keyword(keyword: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidKeyword {
            keyword: keyword.into(),
            value: value.to_string(),
        }
    }

    /// Create an HduNotFound error.
    pub fn hdu_not_found(name: impl Into<String>) -> Self {
        Self::HduNotFound { name: name.into() }
    }
}
