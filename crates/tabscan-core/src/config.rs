//! Scan configuration shared by the archive walker and the file inspector.

/// Default target suffixes
pub const DEFAULT_EXTENSIONS: &[&str] = &[".csv", ".data"];

/// Default delimiter candidates, in preference order.
///
/// Space comes last so that prose inside comma or tab separated cells never
/// outranks the real delimiter.
pub const DEFAULT_DELIMITERS: &[u8] = &[b',', b';', b'\t', b'|', b':', b' '];

/// Default literal values reported as null markers
pub const DEFAULT_NULL_SENTINELS: &[&str] = &["", "?"];

/// Entry name fragment used by macOS archivers for resource forks
pub const PLATFORM_METADATA_DIR: &str = "__MACOSX";

/// Suffix identifying nested archives
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Configuration for a scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Target file suffixes (case-sensitive)
    pub extensions: Vec<String>,
    /// Recurse into zip archives found while scanning a directory
    pub explore_archives: bool,
    /// Number of records sampled when sniffing the delimiter
    pub sniff_lines: usize,
    /// Delimiter candidates, earlier entries win ties
    pub delimiter_candidates: Vec<u8>,
    /// Literal cell values reported as null markers
    pub null_sentinels: Vec<String>,
    /// Nested archives larger than this are skipped
    pub max_nested_archive_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            explore_archives: false,
            sniff_lines: 10,
            delimiter_candidates: DEFAULT_DELIMITERS.to_vec(),
            null_sentinels: DEFAULT_NULL_SENTINELS.iter().map(|s| s.to_string()).collect(),
            max_nested_archive_size: 100 * 1024 * 1024, // 100 MB
        }
    }
}

impl ScanConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target extensions
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether zip archives found in a directory are explored
    pub fn explore_archives(mut self, explore: bool) -> Self {
        self.explore_archives = explore;
        self
    }

    /// Sets the number of records sampled for delimiter detection
    pub fn sniff_lines(mut self, lines: usize) -> Self {
        self.sniff_lines = lines.max(1);
        self
    }

    /// Sets the delimiter candidates
    pub fn delimiter_candidates(mut self, candidates: impl Into<Vec<u8>>) -> Self {
        self.delimiter_candidates = candidates.into();
        self
    }

    /// Sets the null sentinels
    pub fn null_sentinels<I, S>(mut self, sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_sentinels = sentinels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the nested archive size limit
    pub fn max_nested_archive_size(mut self, size: u64) -> Self {
        self.max_nested_archive_size = size;
        self
    }

    /// Splits a comma separated extension list, trimming blanks around items
    pub fn parse_extensions(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Returns true if `name` ends with one of the target extensions
    pub fn is_target(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Returns true if an archive entry belongs to platform metadata
pub fn is_platform_metadata(name: &str) -> bool {
    name.contains(PLATFORM_METADATA_DIR)
}

/// Returns true if `name` looks like a zip archive
pub fn is_archive(name: &str) -> bool {
    name.ends_with(ARCHIVE_SUFFIX)
}
