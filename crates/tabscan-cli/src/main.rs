//! tabscan - Survey delimited files in directories and zip archives
//!
//! This tool finds CSV-like files, optionally inside (nested) zip archives,
//! and writes one report row per file describing its delimiter, shape,
//! null sentinels, probable header and column types.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tabscan_core::config::is_archive;
use tabscan_core::{
    ArchiveWalker, CsvReportWriter, FileReport, Inspector, ReportWriter, ScanConfig, SummaryWriter,
};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Extract schema information from CSV files
#[derive(Parser, Debug)]
#[command(name = "tabscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Input CSV file, zip archive or directory
    input: PathBuf,

    /// Output CSV file
    #[arg(short, long, default_value = "result.csv")]
    output: PathBuf,

    /// Search CSV files inside zip archives (if input is a directory)
    #[arg(
        short = 'c',
        long = "explore_compress_file",
        visible_alias = "explore-compress-file"
    )]
    explore_compress_file: bool,

    /// Comma separated extensions of CSV files
    #[arg(short, long, default_value = ".csv,.data")]
    extensions: String,

    /// Skip nested archives larger than this many bytes
    #[arg(long, default_value_t = 100 * 1024 * 1024)]
    max_nested_size: u64,

    /// Number of records sampled to detect the delimiter
    #[arg(long, default_value_t = 10)]
    sniff_lines: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig::new()
            .extensions(ScanConfig::parse_extensions(&self.extensions))
            .explore_archives(self.explore_compress_file)
            .max_nested_archive_size(self.max_nested_size)
            .sniff_lines(self.sniff_lines)
    }
}

/// What the input argument points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Directory,
    Table,
    Archive,
    Unknown,
    Missing,
}

impl InputKind {
    fn classify(path: &Path, config: &ScanConfig) -> Self {
        if path.is_dir() {
            return InputKind::Directory;
        }
        if !path.is_file() {
            return InputKind::Missing;
        }

        let name = path.to_string_lossy();
        if config.is_target(&name) {
            InputKind::Table
        } else if is_archive(&name) {
            InputKind::Archive
        } else {
            InputKind::Unknown
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    run(&cli)
}

/// Resolve the input, inspect everything found and write the report
fn run(cli: &Cli) -> Result<()> {
    let config = cli.scan_config();

    let Some(reports) = collect_reports(&cli.input, &config) else {
        return Ok(());
    };

    write_reports(&cli.output, &reports)?;

    let mut summary = SummaryWriter::default();
    summary.write_all(&reports)?;
    info!(
        "Summary: {} files, {} unreadable, {} with header, {} with null markers, {} rows",
        summary.files, summary.degraded, summary.with_header, summary.with_nulls, summary.total_rows
    );
    println!("Wrote {} report(s) to {}", summary.files, cli.output.display());

    Ok(())
}

/// Collect reports for the input, or `None` if the input cannot be handled
fn collect_reports(input: &Path, config: &ScanConfig) -> Option<Vec<FileReport>> {
    match InputKind::classify(input, config) {
        InputKind::Directory => Some(scan_directory(input, config)),
        InputKind::Table => {
            let origin = std::env::current_dir()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|_| ".".to_string());
            let inspector = Inspector::with_config(config.clone());
            Some(vec![inspect_file(&inspector, input, &origin)])
        }
        InputKind::Archive => Some(ArchiveWalker::new(config).walk_path(input)),
        InputKind::Unknown => {
            warn!("Unknown file type: {}", input.display());
            None
        }
        InputKind::Missing => {
            error!("Error on input: {} does not exist", input.display());
            None
        }
    }
}

/// Scan a directory recursively for target files and, optionally, archives
fn scan_directory(directory: &Path, config: &ScanConfig) -> Vec<FileReport> {
    info!("Scanning directory: {}", directory.display());

    let origin = directory.display().to_string();
    let inspector = Inspector::with_config(config.clone());
    let mut tables = Vec::new();
    let mut archives = Vec::new();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let name = path.to_string_lossy();
        if config.is_target(&name) {
            tables.push(path.clone());
        }
        if is_archive(&name) {
            archives.push(path.clone());
        }
    }

    debug!(
        "Found {} table(s) and {} archive(s) in {}",
        tables.len(),
        archives.len(),
        directory.display()
    );

    let mut reports: Vec<FileReport> = tables
        .iter()
        .map(|path| inspect_file(&inspector, path, &origin))
        .collect();

    if config.explore_archives {
        let walker = ArchiveWalker::new(config);
        for archive in &archives {
            reports.extend(walker.walk_path(archive));
        }
    } else if !archives.is_empty() {
        trace!("Ignoring {} archive(s), exploration disabled", archives.len());
    }

    reports
}

/// Inspect a file on disk
fn inspect_file(inspector: &Inspector, path: &Path, origin: &str) -> FileReport {
    let name = path.display().to_string();
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    match File::open(path) {
        Ok(file) => inspector.inspect(BufReader::new(file), origin, &name, Some(size)),
        Err(e) => {
            warn!("Failed to open {}: {}", name, e);
            FileReport::degraded(origin, name, size)
        }
    }
}

/// Write all reports as CSV to `output`
fn write_reports(output: &Path, reports: &[FileReport]) -> Result<()> {
    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;

    let mut writer = CsvReportWriter::new(BufWriter::new(file))
        .with_context(|| format!("Failed to write header to {}", output.display()))?;
    writer
        .write_all(reports)
        .with_context(|| format!("Failed to write reports to {}", output.display()))?;
    writer
        .finish()
        .with_context(|| format!("Failed to flush {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("people.csv"), "name,age\nann,31\nbob,42\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/iris.data"), "5.1,3.5\n4.9,3.0\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "plain text").unwrap();
        fs::write(
            dir.path().join("bundle.zip"),
            build_zip(&[("inside.csv", b"a;b\n1;?\n;2\n")]),
        )
        .unwrap();
        dir
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tabscan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["data"]);
        assert_eq!(cli.output, PathBuf::from("result.csv"));
        assert!(!cli.explore_compress_file);

        let config = cli.scan_config();
        assert_eq!(config.extensions, vec![".csv".to_string(), ".data".to_string()]);
        assert!(!config.explore_archives);
    }

    #[test]
    fn test_cli_flags() {
        let cli = parse(&["data", "-o", "out.csv", "-c", "-e", ".tsv, .txt"]);
        let config = cli.scan_config();
        assert_eq!(cli.output, PathBuf::from("out.csv"));
        assert!(config.explore_archives);
        assert_eq!(config.extensions, vec![".tsv".to_string(), ".txt".to_string()]);

        let cli = parse(&["data", "--explore_compress_file"]);
        assert!(cli.explore_compress_file);
    }

    #[test]
    fn test_classify_input() {
        let dir = fixture_dir();
        let config = ScanConfig::default();
        let kind = |p: &str| InputKind::classify(&dir.path().join(p), &config);

        assert_eq!(InputKind::classify(dir.path(), &config), InputKind::Directory);
        assert_eq!(kind("people.csv"), InputKind::Table);
        assert_eq!(kind("bundle.zip"), InputKind::Archive);
        assert_eq!(kind("notes.txt"), InputKind::Unknown);
        assert_eq!(kind("absent.csv"), InputKind::Missing);
    }

    #[test]
    fn test_scan_directory_without_archives() {
        let dir = fixture_dir();
        let reports = scan_directory(dir.path(), &ScanConfig::default());

        assert_eq!(reports.len(), 2);
        let origin = dir.path().display().to_string();
        assert!(reports.iter().all(|r| r.path == origin));
        assert!(reports[0].file.ends_with("people.csv"));
        assert!(reports[1].file.ends_with("iris.data"));
        assert!(reports[0].probably_header);
        assert_eq!(reports[1].rows, 2);
    }

    #[test]
    fn test_scan_directory_with_archives() {
        let dir = fixture_dir();
        let config = ScanConfig::default().explore_archives(true);
        let reports = scan_directory(dir.path(), &config);

        assert_eq!(reports.len(), 3);
        let nested = &reports[2];
        assert!(nested.path.ends_with("bundle.zip"));
        assert_eq!(nested.file, "inside.csv");
        assert_eq!(nested.null_char.as_deref(), Some("blank, ?"));
        assert_eq!(nested.delimiter, Some(';'));
    }

    #[test]
    fn test_unhandled_inputs_produce_nothing() {
        let dir = fixture_dir();
        let config = ScanConfig::default();
        assert!(collect_reports(&dir.path().join("notes.txt"), &config).is_none());
        assert!(collect_reports(&dir.path().join("missing"), &config).is_none());
    }

    #[test]
    fn test_single_archive_input() {
        let dir = fixture_dir();
        let reports = collect_reports(&dir.path().join("bundle.zip"), &ScanConfig::default())
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].file, "inside.csv");
    }

    #[test]
    fn test_run_writes_report() {
        let dir = fixture_dir();
        let output = dir.path().join("result.csv");
        let input = dir.path().to_string_lossy().to_string();
        let out = output.to_string_lossy().to_string();

        run(&parse(&[&input, "-o", &out, "-c"])).unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "path",
                "file",
                "columns",
                "rows",
                "delimiter",
                "null_char",
                "size",
                "probably_header",
                "types"
            ]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][2], "2");
        assert_eq!(&rows[0][3], "3");
        assert_eq!(&rows[0][7], "true");
        assert_eq!(&rows[0][8], "int64, object");
    }

    #[test]
    fn test_run_missing_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("result.csv");
        let input = dir.path().join("nope").to_string_lossy().to_string();
        let out = output.to_string_lossy().to_string();

        run(&parse(&[&input, "-o", &out])).unwrap();
        assert!(!output.exists());
    }
}
