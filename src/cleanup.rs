//! Post-move cleanup: stray non-audio files (cover art, logs, cue sheets)
//! follow their tracks to the new location, and directories emptied by the
//! organizing pass are deleted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::fsutil;
use crate::library::scan;

/// One successfully relocated track: where its directory was, where the
/// track now lives, and the track's new absolute path. Drives the stray
/// relocation replay once all album workers have finished.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub original_dir: PathBuf,
    pub new_dir: PathBuf,
    pub new_path: PathBuf,
}

/// Replay every move record, then sweep the whole tree for empty
/// directories.
pub fn relocate_all(records: &[MoveRecord], root: &Path, settings: &Settings) {
    for record in records {
        relocate_strays(record, settings);
    }

    fsutil::prune_empty_dirs(
        root,
        &settings.organize.ignore_directories,
        &settings.organize.protected_directories,
    );
}

/// Migrate leftover non-audio files from a moved track's original directory
/// into its new one.
///
/// Subdirectories of the original directory (except the new directory itself
/// and ignored names) are searched recursively; their strays land in a
/// same-named subdirectory of the new location, created only when strays
/// exist. A subdirectory that held nothing but strays is pruned afterwards.
/// Non-audio files sitting directly in the original directory move last,
/// overwriting duplicates at the destination.
pub fn relocate_strays(record: &MoveRecord, settings: &Settings) {
    let original_dir = &record.original_dir;
    if !original_dir.exists() {
        return;
    }

    let ignore = &settings.organize.ignore_directories;
    let protected = &settings.organize.protected_directories;

    let entries = match fs::read_dir(original_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %original_dir.display(), error = %e, "failed to enumerate directory");
            return;
        }
    };

    let mut subdirs = Vec::new();
    let mut files = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else {
            files.push(path);
        }
    }

    for subdir in subdirs {
        let Some(name) = subdir.file_name().map(|n| n.to_os_string()) else {
            continue;
        };
        if fsutil::paths_equal(&subdir, &record.new_dir)
            || ignore.iter().any(|d| d.as_str() == name.to_string_lossy())
        {
            continue;
        }

        let all_files: Vec<PathBuf> = WalkDir::new(&subdir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();

        let strays: Vec<&PathBuf> = all_files
            .iter()
            .filter(|f| !scan::is_audio_file(f, &settings.library))
            .collect();

        if !strays.is_empty() {
            let target = record.new_dir.join(&name);
            if let Err(e) = fs::create_dir_all(&target) {
                warn!(path = %target.display(), error = %e, "failed to create directory");
                continue;
            }
            for stray in &strays {
                if let Some(file_name) = stray.file_name() {
                    fsutil::move_file(stray, &target.join(file_name), false);
                }
            }
        }

        // Everything under the subdirectory was a stray: nothing audio is
        // left behind, so its emptied tree can go.
        if strays.len() == all_files.len() {
            fsutil::prune_empty_dirs(&subdir, ignore, protected);
        }
    }

    for file in files {
        if scan::is_audio_file(&file, &settings.library)
            || fsutil::paths_equal(&file, &record.new_path)
        {
            continue;
        }
        if let Some(file_name) = file.file_name() {
            fsutil::move_file(&file, &record.new_dir.join(file_name), true);
        }
    }

    fsutil::prune_empty_dirs(original_dir, ignore, protected);
}
