// pixel-lift/src/core/session.rs
use super::ImageRecord;
use crate::processors::{cleanup_temp_dirs, Discoverer, DiscoveryOptions};
use std::collections::HashSet;
use std::path::PathBuf;

/// The images a caller is currently working on, plus the extraction
/// directories backing any of them.
///
/// A `WorkingSet` is the owner of every extraction directory it collects:
/// records that point into an archive stay readable for as long as the set
/// lives. The directories are deleted on [`WorkingSet::clear`] or when the
/// set is dropped, never earlier. Callers that need extracted files to
/// outlive the set should call [`crate::discover`] directly and manage the
/// returned `temp_dirs` themselves.
#[derive(Default)]
pub struct WorkingSet {
    discoverer: Discoverer,
    records: Vec<ImageRecord>,
    temp_dirs: Vec<PathBuf>,
}

impl WorkingSet {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self {
            discoverer: Discoverer::new(options),
            records: Vec::new(),
            temp_dirs: Vec::new(),
        }
    }

    /// Discovers `raw_paths` and probes every new image. Returns how many
    /// records were added; files whose header cannot be read are skipped.
    pub fn add_paths<S: AsRef<str>>(&mut self, raw_paths: &[S]) -> usize {
        let found = self.discoverer.discover(raw_paths);
        self.temp_dirs.extend(found.temp_dirs);

        let mut existing: HashSet<PathBuf> =
            self.records.iter().map(|r| r.path.clone()).collect();
        let mut added = 0;

        for path in found.images {
            if existing.contains(&path) {
                continue;
            }
            match ImageRecord::probe(&path) {
                Ok(record) => {
                    existing.insert(path);
                    self.records.push(record);
                    added += 1;
                }
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        log::info!("Added {} image(s)", added);
        added
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn temp_dirs(&self) -> &[PathBuf] {
        &self.temp_dirs
    }

    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.file_size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        cleanup_temp_dirs(&self.temp_dirs);
        self.temp_dirs.clear();
    }
}

/// Ending the session releases its extraction directories.
impl Drop for WorkingSet {
    fn drop(&mut self) {
        cleanup_temp_dirs(&self.temp_dirs);
    }
}
