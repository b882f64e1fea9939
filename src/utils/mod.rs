// pixel-lift/src/utils/mod.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp", "gif"];

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

pub fn is_supported_format(path: &Path) -> bool {
    get_file_extension(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_zip_extension(path: &Path) -> bool {
    get_file_extension(path).as_deref() == Some("zip")
}

/// Strips surrounding whitespace and quote characters from a pasted path.
pub fn clean_path_arg(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches(|c| c == '"' || c == '\'').trim())
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} {}", size, UNITS[UNITS.len() - 1])
}

/// Picks `<stem>.<ext>` inside `dir`, or `<stem>_<n>.<ext>` with the
/// smallest `n` that is neither on disk nor already in `used`. The chosen
/// name is recorded in `used`.
pub fn unique_output_path(
    dir: &Path,
    stem: &str,
    extension: &str,
    used: &mut HashSet<String>,
) -> PathBuf {
    let mut name = format!("{}.{}", stem, extension);
    let mut counter = 1;

    while used.contains(&name) || dir.join(&name).exists() {
        name = format!("{}_{}.{}", stem, counter, extension);
        counter += 1;
    }

    let path = dir.join(&name);
    used.insert(name);
    path
}

pub fn sanitize_filename(filename: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    filename
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect()
}
