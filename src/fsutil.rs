//! File-system helpers: name sanitizing, logged move/delete primitives and
//! empty-directory pruning.
//!
//! Every destructive operation here logs the affected path(s); failures are
//! reported to the caller (or swallowed with a warning where the caller has
//! no sensible recovery) so a run can keep making forward progress.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

/// Characters that are not usable in file or directory names on at least one
/// supported platform.
const INVALID_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace characters illegal in file names with `-`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_NAME_CHARS.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect()
}

/// Normalize a string into a legal directory name.
///
/// Illegal characters become `_`, `"; "` collapses to `", "`, repeated dots
/// collapse to one, trailing dots are stripped and doubled spaces removed.
pub fn sanitize_dir_name(name: &str) -> String {
    let mut dir: String = name
        .chars()
        .map(|c| {
            if INVALID_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    dir = dir.replace("; ", ", ");

    while dir.contains("..") {
        dir = dir.replace("..", ".");
    }

    while dir.ends_with('.') {
        dir.pop();
    }

    collapse_double_spaces(&dir).trim().to_string()
}

/// Collapse any run of spaces down to a single space.
pub fn collapse_double_spaces(s: &str) -> String {
    let mut out = s.to_string();
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }
    out
}

/// Compare two paths the way the platform's file system does: ordinal on
/// Unix, case-insensitive on Windows.
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    #[cfg(windows)]
    {
        a.as_os_str().eq_ignore_ascii_case(b.as_os_str())
    }
    #[cfg(not(windows))]
    {
        a == b
    }
}

/// Move a file, logging the source and destination. Falls back to
/// copy-then-delete when the move crosses file systems. Without `overwrite`
/// the destination is reserved atomically, so two concurrent moves to the
/// same path cannot clobber each other. Returns whether the move happened.
pub fn move_file(src: &Path, dest: &Path, overwrite: bool) -> bool {
    let result = if overwrite {
        fs::rename(src, dest).or_else(|_| {
            // Cross-device: copy then delete.
            fs::copy(src, dest).and_then(|_| fs::remove_file(src))
        })
    } else {
        link_into_place(src, dest)
    };

    match result {
        Ok(()) => {
            info!("moved \"{}\" -> \"{}\"", src.display(), dest.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            warn!(
                src = %src.display(),
                dest = %dest.display(),
                "refusing to move onto an existing file"
            );
            false
        }
        Err(e) => {
            warn!(
                src = %src.display(),
                dest = %dest.display(),
                error = %e,
                "failed to move file"
            );
            false
        }
    }
}

/// A rename silently replaces an existing destination, so the no-overwrite
/// path claims it with a hard link, which fails when it already exists.
fn link_into_place(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::hard_link(src, dest) {
        Ok(()) => fs::remove_file(src),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(_) => {
            // Cross-device or the file system has no hard links; `create_new`
            // keeps the same no-overwrite guarantee on the copy.
            let mut out = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dest)?;
            let mut reader = fs::File::open(src)?;
            io::copy(&mut reader, &mut out)?;
            fs::remove_file(src)
        }
    }
}

/// Delete a file, clearing a read-only permission bit first if one is set.
pub fn remove_file_force(path: &Path) -> io::Result<()> {
    if let Ok(metadata) = fs::metadata(path) {
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions)?;
        }
    }
    fs::remove_file(path)
}

/// Recursively delete empty directories beneath `root`, deepest first.
///
/// Subtrees whose directory name appears in `ignore` are not entered.
/// Directories named in `protected` are never deleted, which also keeps
/// every ancestor of theirs alive. `root` itself is left in place.
pub fn prune_empty_dirs(root: &Path, ignore: &[String], protected: &[String]) {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "failed to enumerate directory");
            return;
        }
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if ignore.iter().any(|d| d == &name) {
            continue;
        }

        prune_empty_dirs(&path, ignore, protected);

        if protected.iter().any(|d| d == &name) {
            continue;
        }

        match fs::read_dir(&path) {
            Ok(mut contents) => {
                if contents.next().is_none() {
                    match fs::remove_dir(&path) {
                        Ok(()) => info!("deleted empty directory {}", path.display()),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "failed to delete directory")
                        }
                    }
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to enumerate directory");
            }
        }
    }
}
