//! # tabscan-core
//!
//! A library for surveying delimited text files, including files buried in
//! (nested) zip archives.
//!
//! This crate provides the core functionality for:
//! - Sniffing the delimiter of a delimited file
//! - Counting rows and columns and spotting null sentinels (`""`, `?`)
//! - Inferring column types and guessing whether the first row is a header
//! - Recursively walking zip archives for matching entries
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Scan configuration shared by every component
//! - [`inspect`]: Single file inspection (sniffing and type inference)
//! - [`archive`]: Recursive zip archive walking
//! - [`report`]: Report rows and report writers
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use tabscan_core::{ArchiveWalker, CsvReportWriter, ReportWriter, ScanConfig};
//! use std::fs::File;
//!
//! let config = ScanConfig::new().extensions([".csv", ".tsv"]);
//! let reports = ArchiveWalker::new(&config).walk_path("exports.zip");
//!
//! let mut writer = CsvReportWriter::new(File::create("result.csv")?)?;
//! writer.write_all(&reports)?;
//! writer.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`ReportWriter`]: Customize where reports are written
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod archive;
pub mod config;
pub mod error;
pub mod inspect;
pub mod report;

// Re-export primary types for convenience
pub use archive::ArchiveWalker;
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use inspect::{ColumnType, Inspection, Inspector, Schema};
pub use report::{format_size, CsvReportWriter, FileReport, ReportWriter, SummaryWriter};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
