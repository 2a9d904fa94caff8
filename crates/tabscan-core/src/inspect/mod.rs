//! Delimited file inspection.
//!
//! This module turns the bytes of a single delimited file into a
//! [`FileReport`].
//!
//! ## Algorithm Overview
//!
//! 1. Read the stream into memory once; every later pass parses the buffer
//! 2. Sniff the delimiter from a sample of records
//! 3. Parse all records as untyped text (no header) for the row/column
//!    counts and null sentinel scan
//! 4. Infer a schema over all records, and another over all records but the
//!    first; if they disagree the first row is probably a header
//!
//! Any failure yields a degraded report instead of an error, so one bad
//! file never stops a batch.

mod infer;
mod sniff;

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::report::{format_size, FileReport};
use csv::StringRecord;
use std::collections::BTreeSet;
use std::io::Read;
use tracing::{debug, trace, warn};

pub use infer::{is_missing, ColumnType, Schema, NA_VALUES};
pub use sniff::sniff_delimiter;

/// Label used for the empty-string sentinel
const BLANK_LABEL: &str = "blank";

/// Shape of a successfully parsed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Detected delimiter
    pub delimiter: u8,
    /// Width of the first record
    pub columns: usize,
    /// Number of records, first row included
    pub rows: usize,
    /// Sentinels found, in configuration order
    pub null_sentinels: Vec<String>,
    /// Schema with the first row read as data
    pub schema_with_first_row: Schema,
    /// Schema with the first row read as header
    pub schema_without_first_row: Schema,
}

impl Inspection {
    /// Returns true if the first row's types differ from the rest
    pub fn probably_header(&self) -> bool {
        !self
            .schema_with_first_row
            .differing_columns(&self.schema_without_first_row)
            .is_empty()
    }

    /// Returns the sentinel description, e.g. `blank, ?`
    pub fn null_char(&self) -> Option<String> {
        if self.null_sentinels.is_empty() {
            return None;
        }
        let labels: Vec<&str> = self
            .null_sentinels
            .iter()
            .map(|s| if s.is_empty() { BLANK_LABEL } else { s.as_str() })
            .collect();
        Some(labels.join(", "))
    }

    /// Converts the inspection into a report row
    pub fn into_report(self, path: &str, file: &str, size: u64) -> FileReport {
        FileReport {
            path: path.to_string(),
            file: file.to_string(),
            columns: self.columns,
            rows: self.rows,
            delimiter: Some(self.delimiter as char),
            null_char: self.null_char(),
            size: format_size(size),
            probably_header: self.probably_header(),
            types: self.types(),
        }
    }

    /// Returns the distinct column types, first row excluded
    pub fn types(&self) -> BTreeSet<ColumnType> {
        self.schema_without_first_row.distinct()
    }
}

/// Inspector for single delimited files
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    config: ScanConfig,
}

impl Inspector {
    /// Creates an inspector with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inspector with custom configuration
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Inspects a byte stream and always returns a report.
    ///
    /// `size` is the byte count shown in the report; when absent the number
    /// of bytes read is used.
    pub fn inspect<R: Read>(
        &self,
        mut reader: R,
        path: &str,
        file: &str,
        size: Option<u64>,
    ) -> FileReport {
        debug!("Inspecting {} # {}", path, file);

        let mut data = Vec::new();
        if let Err(e) = reader.read_to_end(&mut data) {
            let err = Error::file_read(file, e);
            warn!("Inspection failed for {} # {}: {}", path, file, err);
            return FileReport::degraded(path, file, size.unwrap_or(0));
        }
        let size = size.unwrap_or(data.len() as u64);

        match self.inspect_bytes(&data) {
            Ok(inspection) => inspection.into_report(path, file, size),
            Err(e) => {
                warn!("Inspection failed for {} # {}: {}", path, file, e);
                FileReport::degraded(path, file, size)
            }
        }
    }

    /// Inspects an in-memory buffer
    pub fn inspect_bytes(&self, data: &[u8]) -> Result<Inspection> {
        let delimiter = sniff_delimiter(
            data,
            &self.config.delimiter_candidates,
            self.config.sniff_lines,
        )?;
        trace!("Detected delimiter {:?}", delimiter as char);

        let records = read_records(data, delimiter)?;
        let columns = records.first().map_or(0, StringRecord::len);

        let null_sentinels = self
            .config
            .null_sentinels
            .iter()
            .filter(|sentinel| contains_cell(&records, sentinel))
            .cloned()
            .collect();

        let schema_with_first_row = Schema::infer(&records, columns);
        let schema_without_first_row = Schema::infer(records.iter().skip(1), columns);

        Ok(Inspection {
            delimiter,
            columns,
            rows: records.len(),
            null_sentinels,
            schema_with_first_row,
            schema_without_first_row,
        })
    }
}

/// Parses every record as text; records wider than the first one are rejected
fn read_records(data: &[u8], delimiter: u8) -> Result<Vec<StringRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut records: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(first) = records.first() {
            if record.len() > first.len() {
                return Err(Error::RaggedRecord {
                    line: record.position().map_or(0, |p| p.line()),
                    expected: first.len(),
                    found: record.len(),
                });
            }
        }
        records.push(record);
    }
    Ok(records)
}

fn contains_cell(records: &[StringRecord], needle: &str) -> bool {
    records
        .iter()
        .any(|record| record.iter().any(|cell| cell == needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn inspect(data: &str) -> FileReport {
        Inspector::new().inspect(Cursor::new(data.as_bytes()), "dir", "table.csv", None)
    }

    #[test]
    fn test_shape_matches_parse() {
        let report = inspect("id,name,score\n1,ann,1.5\n2,bob,2.0\n3,cid,2.5\n");
        assert_eq!(report.columns, 3);
        assert_eq!(report.rows, 4);
        assert_eq!(report.delimiter, Some(','));
        assert_eq!(report.path, "dir");
        assert_eq!(report.file, "table.csv");
    }

    #[test]
    fn test_header_detected() {
        let report = inspect("id;value\n1;10\n2;20\n");
        assert!(report.probably_header);
        assert_eq!(
            report.types.into_iter().collect::<Vec<_>>(),
            vec![ColumnType::Int64]
        );
    }

    #[test]
    fn test_uniform_file_has_no_header() {
        let report = inspect("1,2.5,x\n3,4.5,y\n5,6.5,z\n");
        assert!(!report.probably_header);
        assert_eq!(report.rows, 3);
        assert_eq!(report.types_label(), "float64, int64, object");
    }

    #[test]
    fn test_text_header_over_text_is_ambiguous() {
        let report = inspect("name,city\nann,rome\nbob,oslo\n");
        assert!(!report.probably_header);
        assert_eq!(report.types_label(), "object");
    }

    #[test]
    fn test_blank_sentinel() {
        let report = inspect("a,b\n1,\n2,3\n");
        assert_eq!(report.null_char.as_deref(), Some("blank"));
    }

    #[test]
    fn test_question_mark_sentinel() {
        let report = inspect("a,b\n1,?\n2,3\n");
        assert_eq!(report.null_char.as_deref(), Some("?"));
    }

    #[test]
    fn test_both_sentinels() {
        let report = inspect("a,b\n1,?\n,3\n");
        assert_eq!(report.null_char.as_deref(), Some("blank, ?"));
    }

    #[test]
    fn test_no_sentinels() {
        let report = inspect("a,b\n1,2\n");
        assert_eq!(report.null_char, None);
    }

    #[test]
    fn test_blank_cells_do_not_flag_header() {
        let report = inspect("1,\n2,5\n3,\n");
        assert!(!report.probably_header);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let report = inspect("a,b,c\n1,2,3\n4,5\n");
        assert_eq!(report.columns, 3);
        assert_eq!(report.rows, 3);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_ragged_file_is_degraded() {
        let report = inspect("a,b\n1,2\n3,4\n5,6,7\n");
        assert!(report.is_degraded());
        assert_eq!(report.size, "18.0 B");
    }

    #[test]
    fn test_time_column_keeps_comma_split() {
        let report = inspect("1,12:30:00\n2,13:00:00\n3,14:15:00\n");
        assert_eq!(report.delimiter, Some(','));
        assert_eq!(report.columns, 2);
        assert_eq!(report.rows, 3);
        assert!(!report.probably_header);
    }

    #[test]
    fn test_space_delimited_data_file() {
        let data = "18.0 8 307.0 chevrolet\n15.0 8 350.0 buick\n18.0 8 318.0 plymouth\n";
        let report =
            Inspector::new().inspect(Cursor::new(data.as_bytes()), "uci", "auto-mpg.data", None);
        assert!(!report.is_degraded());
        assert_eq!(report.delimiter, Some(' '));
        assert_eq!(report.columns, 4);
        assert_eq!(report.rows, 3);
        assert!(!report.probably_header);
        assert_eq!(report.types_label(), "float64, int64, object");
    }

    #[test]
    fn test_undetermined_delimiter_is_degraded() {
        let report = inspect("just\none\ncolumn\n");
        assert!(report.is_degraded());
        assert_eq!(report.columns, 0);
        assert_eq!(report.rows, 0);
    }

    #[test]
    fn test_invalid_utf8_is_degraded() {
        let data: &[u8] = b"a,b\n\xff\xfe,1\n";
        let report = Inspector::new().inspect(data, "dir", "bin.csv", Some(4096));
        assert!(report.is_degraded());
        assert_eq!(report.size, "4.0 KB");
    }

    #[test]
    fn test_inspect_bytes_schemas() {
        let inspection = Inspector::new()
            .inspect_bytes(b"x|y\n1|true\n2|false\n")
            .unwrap();
        assert_eq!(inspection.delimiter, b'|');
        assert_eq!(
            inspection.schema_with_first_row.columns(),
            &[ColumnType::Object, ColumnType::Object]
        );
        assert_eq!(
            inspection.schema_without_first_row.columns(),
            &[ColumnType::Int64, ColumnType::Bool]
        );
        assert!(inspection.probably_header());
    }

    #[test]
    fn test_custom_sentinels() {
        let config = ScanConfig::new().null_sentinels(["-", "?"]);
        let report = Inspector::with_config(config).inspect(
            Cursor::new("a,b\n-,1\n2,3\n"),
            "dir",
            "t.csv",
            None,
        );
        assert_eq!(report.null_char.as_deref(), Some("-"));
    }
}
