//! Zip archive walking.
//!
//! The [`ArchiveWalker`] lists the entries of a zip archive that match the
//! target extensions, inspects each one, then recurses into every nested
//! `.zip` entry. Nested archives are buffered in memory since zip entries
//! cannot be seeked.
//!
//! Entries whose name contains `__MACOSX` are skipped. Report origins of
//! nested archives are chained with `/`, so a file found two levels down
//! reports `outer.zip/inner.zip/deeper.zip` as its path.
//!
//! A corrupt archive only loses its own branch: the failure is logged and
//! the branch contributes no reports.

use crate::config::{is_archive, is_platform_metadata, ScanConfig};
use crate::error::{Error, Result};
use crate::inspect::Inspector;
use crate::report::FileReport;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Recursive walker over zip archives
#[derive(Debug, Clone)]
pub struct ArchiveWalker {
    config: ScanConfig,
    inspector: Inspector,
}

impl Default for ArchiveWalker {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl ArchiveWalker {
    /// Creates a walker for the given configuration
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            config: config.clone(),
            inspector: Inspector::with_config(config.clone()),
        }
    }

    /// Opens the archive at `path` and walks it, using the path as origin
    pub fn walk_path(&self, path: impl AsRef<Path>) -> Vec<FileReport> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Error opening archive: {}", Error::file_read(path, e));
                return Vec::new();
            }
        };

        self.walk_reader(BufReader::new(file), &origin)
    }

    /// Walks an archive read from `reader`; failures yield an empty result
    pub fn walk_reader<R: Read + Seek>(&self, reader: R, origin: &str) -> Vec<FileReport> {
        match self.try_walk_reader(reader, origin) {
            Ok(reports) => reports,
            Err(e) => {
                warn!("Skipping archive {}: {}", origin, e);
                Vec::new()
            }
        }
    }

    /// Walks an archive read from `reader`, surfacing the error if the
    /// archive itself cannot be opened
    pub fn try_walk_reader<R: Read + Seek>(
        &self,
        reader: R,
        origin: &str,
    ) -> Result<Vec<FileReport>> {
        info!("Opening archive: {}", origin);
        let mut archive = ZipArchive::new(reader).map_err(|e| Error::archive(origin, e))?;

        let names = entry_names(&mut archive);

        let mut reports = Vec::new();

        for name in names.iter().filter(|name| self.config.is_target(name)) {
            reports.push(self.inspect_entry(&mut archive, origin, name));
        }

        for name in names.iter().filter(|name| is_archive(name)) {
            let nested_origin = format!("{}/{}", origin, name);
            match self.read_nested(&mut archive, origin, name) {
                Ok(data) => reports.extend(self.walk_reader(Cursor::new(data), &nested_origin)),
                Err(e) => warn!("Skipping nested archive {}: {}", nested_origin, e),
            }
        }

        debug!("Archive {} yielded {} report(s)", origin, reports.len());
        Ok(reports)
    }

    fn inspect_entry<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        origin: &str,
        name: &str,
    ) -> FileReport {
        match archive.by_name(name) {
            Ok(entry) => {
                let size = entry.size();
                self.inspector.inspect(entry, origin, name, Some(size))
            }
            Err(e) => {
                warn!("Error reading entry {} # {}: {}", origin, name, e);
                FileReport::degraded(origin, name, 0)
            }
        }
    }

    fn read_nested<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        origin: &str,
        name: &str,
    ) -> Result<Vec<u8>> {
        let mut entry = archive
            .by_name(name)
            .map_err(|e| Error::archive(format!("{}/{}", origin, name), e))?;

        let limit = self.config.max_nested_archive_size;
        let too_large = |size: u64| Error::NestedArchiveTooLarge {
            name: name.to_string(),
            size,
            limit,
        };
        if entry.size() > limit {
            return Err(too_large(entry.size()));
        }

        // The declared size is untrusted: grow the buffer while reading and
        // stop one byte past the limit.
        let mut data = Vec::new();
        entry
            .by_ref()
            .take(limit.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|e| Error::file_read(format!("{}/{}", origin, name), e))?;
        if data.len() as u64 > limit {
            return Err(too_large(data.len() as u64));
        }
        Ok(data)
    }
}

/// Lists file entries in central directory order, platform metadata excluded
fn entry_names<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Vec<String> {
    (0..archive.len())
        .filter_map(|i| match archive.by_index_raw(i) {
            Ok(entry) if !entry.is_dir() => Some(entry.name().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Skipping unreadable entry #{}: {}", i, e);
                None
            }
        })
        .filter(|name| !is_platform_metadata(name))
        .collect()
}
