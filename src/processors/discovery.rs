// pixel-lift/src/processors/discovery.rs
//! Resolves user-supplied paths (files, directory trees, ZIP archives) into a
//! flat, deduplicated list of image files.
//!
//! Discovery is best effort: missing paths, unreadable entries and bad
//! archives are logged and skipped, never returned as errors. Archives are
//! extracted into fresh temporary directories that the caller owns and must
//! release with [`cleanup_temp_dirs`] once no record points into them.

use crate::utils::{clean_path_arg, is_supported_format, is_zip_extension};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

const TEMP_PREFIX: &str = "pixel_lift_";

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Archives nested deeper than this are skipped. A top-level archive is
    /// depth 0.
    pub max_archive_depth: usize,
    /// Ceiling on the declared uncompressed size of everything one call
    /// extracts.
    pub max_extracted_bytes: u64,
    /// Parent for extraction directories; the system temp dir when `None`.
    pub temp_root: Option<PathBuf>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_archive_depth: 8,
            max_extracted_bytes: 2 * 1024 * 1024 * 1024,
            temp_root: None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub images: Vec<PathBuf>,
    pub temp_dirs: Vec<PathBuf>,
}

/// Mutable state threaded through one discovery call.
#[derive(Default)]
struct ScanState {
    seen: HashSet<PathBuf>,
    found: Discovery,
    extracted_bytes: u64,
}

pub struct Discoverer {
    options: DiscoveryOptions,
}

impl Discoverer {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    pub fn discover<S: AsRef<str>>(&self, raw_paths: &[S]) -> Discovery {
        let mut state = ScanState::default();

        for raw in raw_paths {
            let path = clean_path_arg(raw.as_ref());
            if !path.exists() {
                log::debug!("Skipping missing path: {}", path.display());
                continue;
            }

            if path.is_dir() {
                self.scan_directory(&path, 0, &mut state);
            } else if is_zip_extension(&path) {
                self.expand_archive(&path, 0, &mut state);
            } else if path.is_file() && is_supported_format(&path) {
                add_image(&path, &mut state);
            } else {
                log::debug!("Ignoring unsupported file: {}", path.display());
            }
        }

        log::info!(
            "Discovered {} images ({} archives extracted)",
            state.found.images.len(),
            state.found.temp_dirs.len()
        );

        state.found
    }

    fn scan_directory(&self, dir: &Path, depth: usize, state: &mut ScanState) {
        let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_supported_format(path) {
                add_image(path, state);
            } else if is_zip_extension(path) {
                self.expand_archive(path, depth, state);
            }
        }
    }

    fn expand_archive(&self, path: &Path, depth: usize, state: &mut ScanState) {
        if !state.seen.insert(resolve(path)) {
            return;
        }

        if depth >= self.options.max_archive_depth {
            log::warn!(
                "Skipping {}: archive nesting exceeds {} levels",
                path.display(),
                self.options.max_archive_depth
            );
            return;
        }

        let mut archive = match File::open(path)
            .map_err(zip::result::ZipError::from)
            .and_then(|file| ZipArchive::new(BufReader::new(file)))
        {
            Ok(archive) => archive,
            Err(e) => {
                log::warn!("Skipping invalid archive {}: {}", path.display(), e);
                return;
            }
        };

        let declared = declared_size(&mut archive);
        if state.extracted_bytes.saturating_add(declared) > self.options.max_extracted_bytes {
            log::warn!(
                "Skipping {}: extracting {} bytes would exceed the {} byte ceiling",
                path.display(),
                declared,
                self.options.max_extracted_bytes
            );
            return;
        }

        let target = match self.make_temp_dir() {
            Ok(dir) => dir,
            Err(e) => {
                log::warn!("Cannot create extraction directory for {}: {}", path.display(), e);
                return;
            }
        };

        if let Err(e) = archive.extract(&target) {
            log::warn!("Failed to extract {}: {}", path.display(), e);
            let _ = std::fs::remove_dir_all(&target);
            return;
        }

        log::debug!("Extracted {} into {}", path.display(), target.display());
        state.extracted_bytes += declared;
        state.found.temp_dirs.push(target.clone());
        self.scan_directory(&target, depth + 1, state);
    }

    fn make_temp_dir(&self) -> std::io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match &self.options.temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir.keep())
    }
}

impl Default for Discoverer {
    fn default() -> Self {
        Self::new(DiscoveryOptions::default())
    }
}

/// Discovery with default options.
pub fn discover<S: AsRef<str>>(raw_paths: &[S]) -> Discovery {
    Discoverer::default().discover(raw_paths)
}

/// Recursively deletes extraction directories. Failures are logged.
pub fn cleanup_temp_dirs(dirs: &[PathBuf]) {
    for dir in dirs {
        if let Err(e) = std::fs::remove_dir_all(dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
    }
}

fn add_image(path: &Path, state: &mut ScanState) {
    let resolved = resolve(path);
    if state.seen.insert(resolved.clone()) {
        state.found.images.push(resolved);
    }
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn declared_size<R: std::io::Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> u64 {
    (0..archive.len())
        .filter_map(|i| archive.by_index_raw(i).ok().map(|entry| entry.size()))
        .fold(0u64, |acc, size| acc.saturating_add(size))
}
