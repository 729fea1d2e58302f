//! Computing a track's canonical destination path.
//!
//! Planning is pure: it never touches the file system, so recomputing a
//! plan for an already-organized file yields its current path and the
//! organizing pass becomes a no-op on a second run.

use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::library::Track;

/// Per-album context a plan is computed against.
#[derive(Debug)]
pub struct AlbumContext<'a> {
    pub root: &'a Path,
    pub artist: &'a str,
    pub use_artist_subdirectory: bool,
    /// Total disc count for the album; `None` for unknown-album
    /// pseudo-albums, which never get disc handling.
    pub total_discs: Option<u32>,
    pub disc_subdirectories: bool,
}

/// The outcome of planning one track: the destination, the (possibly
/// disc-backfilled) track value, and whether that backfill must be written
/// back to the file's tags. The persist decision is deliberately separate
/// from the mutation so callers can batch or test it on its own.
#[derive(Debug)]
pub struct TrackPlan {
    pub track: Track,
    pub destination: PathBuf,
    pub needs_tag_save: bool,
}

/// Compute the canonical destination for `track` within its album.
pub fn plan_track(track: &Track, album: &str, ctx: &AlbumContext) -> TrackPlan {
    let mut track = track.clone();

    let mut title = track.title.clone();
    let stem = track.path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    if stem == track.title {
        // The title came from the file name (no tag), so it may carry a
        // track-number prefix, possibly repeated ("01 - 01 - Title") when a
        // previous run stripped only one layer.
        let stripped = title.trim_start_matches(|c: char| {
            c.is_ascii_digit() || c == '.' || c == '-' || c == '_' || c.is_whitespace()
        });
        // An all-digit stem ("1999") is a title, not a prefix.
        if !stripped.is_empty() {
            title = stripped.to_string();
        }
    }
    title = fsutil::collapse_double_spaces(&title);

    let extension = track
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut file_name = match track.track_number {
        Some(number) if number > 0 => format!("{number:02}. {title}{extension}"),
        _ => format!("{title}{extension}"),
    };

    let mut album_dir = if album.trim().is_empty() {
        "Unknown Album".to_string()
    } else {
        fsutil::sanitize_dir_name(album)
    };
    if let Some(year) = track.year {
        if year > 0 {
            album_dir = format!("{year} - {album_dir}");
        }
    }

    let mut segments: Vec<String> = Vec::with_capacity(4);
    if ctx.use_artist_subdirectory {
        segments.push(fsutil::sanitize_dir_name(ctx.artist));
    }
    segments.push(album_dir);

    let mut needs_tag_save = false;
    if let Some(total_discs) = ctx.total_discs {
        if total_discs > 1 {
            if track.disc_number.is_none() || track.disc_number == Some(0) {
                track.disc_number = Some(1);
                needs_tag_save = true;
            }
            if track.disc_total.is_none() || track.disc_total == Some(0) {
                track.disc_total = Some(total_discs);
                needs_tag_save = true;
            }

            let disc = track.disc_number.unwrap_or(1);
            file_name = format!("{disc}_{file_name}");
            if ctx.disc_subdirectories {
                segments.push(format!("Disc {disc}"));
            }
        }
    }

    let file_name = fsutil::sanitize_file_name(&file_name);

    let mut destination = ctx.root.to_path_buf();
    for segment in &segments {
        destination.push(segment);
    }
    destination.push(&file_name);

    TrackPlan {
        track,
        destination,
        needs_tag_save,
    }
}
