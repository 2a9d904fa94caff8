//! Report model.
//!
//! A [`FileReport`] is one row of the final output: where a delimited file
//! was found and what its shape looks like. Reports are emitted through the
//! [`ReportWriter`] trait.

mod writer;

use crate::inspect::ColumnType;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

pub use writer::{CsvReportWriter, ReportWriter, SummaryWriter};

/// Units used by [`format_size`]
const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Column order of the rendered report
pub const REPORT_COLUMNS: &[&str] = &[
    "path",
    "file",
    "columns",
    "rows",
    "delimiter",
    "null_char",
    "size",
    "probably_header",
    "types",
];

/// Schema-level summary of one delimited file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Directory or archive origin (nested archives are joined with `/`)
    pub path: String,
    /// Name of the file within its origin
    pub file: String,
    /// Width of the first record
    pub columns: usize,
    /// Number of non-blank records, header included
    pub rows: usize,
    /// Detected field delimiter
    pub delimiter: Option<char>,
    /// Null sentinels found, e.g. `blank, ?`
    pub null_char: Option<String>,
    /// Human readable byte count
    pub size: String,
    /// First row types differ from the rest of the file
    pub probably_header: bool,
    /// Distinct column types, first row excluded
    #[serde(serialize_with = "serialize_types")]
    pub types: BTreeSet<ColumnType>,
}

impl FileReport {
    /// Creates the report for a file that could not be parsed
    pub fn degraded(path: impl Into<String>, file: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            file: file.into(),
            columns: 0,
            rows: 0,
            delimiter: None,
            null_char: None,
            size: format_size(size),
            probably_header: false,
            types: BTreeSet::new(),
        }
    }

    /// Returns true if this is a degraded report
    pub fn is_degraded(&self) -> bool {
        self.delimiter.is_none() && self.rows == 0 && self.columns == 0
    }

    /// Returns the type names joined the way they are rendered
    pub fn types_label(&self) -> String {
        join_types(&self.types)
    }
}

fn join_types(types: &BTreeSet<ColumnType>) -> String {
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn serialize_types<S: Serializer>(
    types: &BTreeSet<ColumnType>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&join_types(types))
}

/// Formats a byte count with 1024-based units, rounded to two decimals
///
/// ```
/// use tabscan_core::format_size;
///
/// assert_eq!(format_size(0), "0B");
/// assert_eq!(format_size(1024), "1.0 KB");
/// assert_eq!(format_size(1_500_000), "1.43 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut unit = 0;
    let mut scale: u128 = 1;
    while unit + 1 < SIZE_UNITS.len() && (bytes as u128) >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = ((bytes as f64 / scale as f64) * 100.0).round() / 100.0;
    if value.fract() == 0.0 {
        format!("{:.1} {}", value, SIZE_UNITS[unit])
    } else {
        format!("{} {}", value, SIZE_UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(500), "500.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_500_000), "1.43 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_degraded_report() {
        let report = FileReport::degraded("data", "broken.csv", 2048);
        assert!(report.is_degraded());
        assert_eq!(report.size, "2.0 KB");
        assert_eq!(report.delimiter, None);
        assert!(report.types.is_empty());
        assert_eq!(report.types_label(), "");
    }

    #[test]
    fn test_types_label_sorted() {
        let mut report = FileReport::degraded("data", "x.csv", 0);
        report.types.insert(ColumnType::Object);
        report.types.insert(ColumnType::Int64);
        assert_eq!(report.types_label(), "int64, object");
    }
}
