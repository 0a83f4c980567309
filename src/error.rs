//! Error types for hcpack

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pack and extract operations
pub type PackResult<T> = Result<T, PackError>;

/// Errors that can occur during packing or extraction
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header does not start with the HCPK magic bytes
    #[error("invalid package magic: found {found:?}")]
    InvalidMagic {
        /// The bytes found where the magic was expected
        found: [u8; 4],
    },

    /// Tail scan found no marker in the scan window
    #[error("marker not found in the last {scanned} bytes; is a package appended?")]
    MarkerNotFound {
        /// Number of bytes that were scanned
        scanned: usize,
    },

    /// A length-prefixed field claims more bytes than remain in the stream
    #[error("truncated input: {field} needs {needed} bytes, {remaining} remain")]
    TruncatedInput {
        /// Which field was being read
        field: &'static str,
        /// Bytes the field requires
        needed: usize,
        /// Bytes left in the stream
        remaining: usize,
    },

    /// Container version outside the configured accepted set
    #[error("unsupported container version: {0}")]
    UnsupportedVersion(u32),

    /// Resource name rejected at pack time
    #[error("invalid resource name: {0}")]
    InvalidResourceName(String),

    /// Packer could not open or read an input file
    #[error("cannot read source file {path}: {source}")]
    SourceFileUnreadable {
        /// The input file that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Invalid manifest file
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
