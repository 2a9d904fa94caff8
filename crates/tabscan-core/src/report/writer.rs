//! Report output traits.
//!
//! This module provides the [`ReportWriter`] trait for customizing where
//! file reports end up.

use super::{FileReport, REPORT_COLUMNS};
use crate::error::{Error, Result};
use std::io::Write;

/// Trait for emitting file reports.
///
/// # Example
///
/// ```ignore
/// use tabscan_core::report::{FileReport, ReportWriter};
///
/// struct PrintWriter;
///
/// impl ReportWriter for PrintWriter {
///     fn write_report(&mut self, report: &FileReport) -> Result<()> {
///         println!("{} {}", report.file, report.rows);
///         Ok(())
///     }
/// }
/// ```
pub trait ReportWriter {
    /// Write a single report
    fn write_report(&mut self, report: &FileReport) -> Result<()>;

    /// Write a batch of reports in order
    fn write_all(&mut self, reports: &[FileReport]) -> Result<()> {
        for report in reports {
            self.write_report(report)?;
        }
        Ok(())
    }

    /// Flush any buffered output
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes reports as CSV rows, header first
pub struct CsvReportWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvReportWriter<W> {
    /// Creates a writer and emits the header row
    pub fn new(output: W) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        inner
            .write_record(REPORT_COLUMNS)
            .map_err(|e| Error::report_write(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| Error::report_write(e.to_string()))
    }
}

impl<W: Write> ReportWriter for CsvReportWriter<W> {
    fn write_report(&mut self, report: &FileReport) -> Result<()> {
        self.inner
            .serialize(report)
            .map_err(|e| Error::report_write(e.to_string()))
    }

    fn finish(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| Error::report_write(e.to_string()))
    }
}

/// A writer that collects statistics about the reports it sees
#[derive(Debug, Default)]
pub struct SummaryWriter {
    /// Number of reports
    pub files: usize,
    /// Number of degraded reports
    pub degraded: usize,
    /// Number of files flagged as probably having a header
    pub with_header: usize,
    /// Number of files with at least one null sentinel
    pub with_nulls: usize,
    /// Sum of all row counts
    pub total_rows: usize,
}

impl ReportWriter for SummaryWriter {
    fn write_report(&mut self, report: &FileReport) -> Result<()> {
        self.files += 1;
        if report.is_degraded() {
            self.degraded += 1;
        }
        if report.probably_header {
            self.with_header += 1;
        }
        if report.null_char.is_some() {
            self.with_nulls += 1;
        }
        self.total_rows += report.rows;
        Ok(())
    }
}
