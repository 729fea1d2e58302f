use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

fn has_extension_in(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

/// Whether `path` is a recognized audio file, by extension only.
pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    has_extension_in(path, &settings.extensions)
}

/// Whether `path` is in a lossless format eligible for re-encoding.
pub fn is_lossless_file(path: &Path, settings: &LibrarySettings) -> bool {
    has_extension_in(path, &settings.lossless_extensions)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_ignored(path: &Path, ignore_directories: &[String]) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| ignore_directories.iter().any(|d| d == name))
        .unwrap_or(false)
}

fn walk(root: &Path, settings: &LibrarySettings, ignore_directories: &[String]) -> Vec<PathBuf> {
    let include_hidden = settings.include_hidden;

    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || ((include_hidden || !is_hidden(e.path()))
                    && !is_ignored(e.path(), ignore_directories))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Enumerate all audio files under `root`, skipping hidden directories
/// (unless configured otherwise) and the ignore set.
pub fn find_audio_files(
    root: &Path,
    settings: &LibrarySettings,
    ignore_directories: &[String],
) -> Vec<PathBuf> {
    walk(root, settings, ignore_directories)
        .into_iter()
        .filter(|p| is_audio_file(p, settings))
        .collect()
}

/// Enumerate all lossless audio files under `root`.
pub fn find_lossless_files(
    root: &Path,
    settings: &LibrarySettings,
    ignore_directories: &[String],
) -> Vec<PathBuf> {
    walk(root, settings, ignore_directories)
        .into_iter()
        .filter(|p| is_lossless_file(p, settings))
        .collect()
}
