//! Error types for the tabscan-core library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! one variant per failure mode of inspection, archive walking and
//! report output.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tabscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all tabscan operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read an input file or archive entry
    #[error("failed to read '{path}': {source}")]
    FileRead {
        /// Path (or archive entry) that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be opened or one of its entries could not be located
    #[error("failed to open archive '{origin}': {source}")]
    Archive {
        /// Display origin of the archive (path or nested chain)
        origin: String,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Delimited content could not be parsed
    #[error("failed to parse delimited content: {0}")]
    Csv(#[from] csv::Error),

    /// None of the candidate delimiters split the sample into a stable table
    #[error("could not determine delimiter")]
    DelimiterUndetermined,

    /// A record carries more fields than the first record
    #[error("record on line {line} has {found} fields, expected at most {expected}")]
    RaggedRecord {
        /// 1-based line number of the offending record
        line: u64,
        /// Width of the first record
        expected: usize,
        /// Width of the offending record
        found: usize,
    },

    /// Nested archive exceeds the configured in-memory limit
    #[error("nested archive '{name}' is {size} bytes, limit is {limit}")]
    NestedArchiveTooLarge {
        /// Entry name of the nested archive
        name: String,
        /// Uncompressed size of the entry
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// Failed to write the report
    #[error("failed to write report: {0}")]
    ReportWrite(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new archive error
    pub fn archive(origin: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            origin: origin.into(),
            source,
        }
    }

    /// Creates a new report write error
    pub fn report_write(msg: impl Into<String>) -> Self {
        Self::ReportWrite(msg.into())
    }

    /// Returns true if this error only affects a single file or archive branch
    /// and the surrounding batch should carry on
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ReportWrite(_))
    }
}
