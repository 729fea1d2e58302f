//! The organizing pass: group tracks by album, fan out one worker per album
//! group, and turn each track into either a move or a registered conflict.
//!
//! Workers share nothing: each returns its own conflicts and move records,
//! which are merged after the parallel map joins. Conflict resolution and
//! stray relocation run strictly after that barrier.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cleanup::{self, MoveRecord};
use crate::config::{OrganizeSettings, Settings};
use crate::conflict::{self, TrackConflict};
use crate::fsutil;
use crate::library::{Track, scan, tags};

mod artist;
mod plan;

pub use plan::{AlbumContext, plan_track};

/// What one album worker produced: registered conflicts and completed moves.
#[derive(Debug, Default)]
struct AlbumOutcome {
    conflicts: Vec<TrackConflict>,
    moves: Vec<MoveRecord>,
}

/// Run the full organizing pipeline over the music tree at `root`.
pub fn run(root: &Path, settings: &Settings) -> anyhow::Result<()> {
    let audio_files = scan::find_audio_files(
        root,
        &settings.library,
        &settings.organize.ignore_directories,
    );
    info!("found {} audio files under {}", audio_files.len(), root.display());

    let tracks: Vec<Track> = audio_files
        .par_iter()
        .filter_map(|path| match tags::load_track(path) {
            Ok(track) => Some(track),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                None
            }
        })
        .collect();

    let groups = group_by_album(tracks);
    info!("organizing {} album groups", groups.len());

    let outcomes: Vec<AlbumOutcome> = groups
        .into_par_iter()
        .map(|(album, album_tracks)| organize_album(&album, album_tracks, root, &settings.organize))
        .collect();

    let mut conflicts = Vec::new();
    let mut moves = Vec::new();
    for outcome in outcomes {
        conflicts.extend(outcome.conflicts);
        moves.extend(outcome.moves);
    }

    let conflicts = conflict::dedup_conflicts(conflicts);
    if !conflicts.is_empty() {
        info!("resolving {} path conflicts", conflicts.len());
    }
    let mut unresolved = 0usize;
    for c in &conflicts {
        if !conflict::resolve(c) {
            unresolved += 1;
        }
    }
    if unresolved > 0 {
        warn!("{unresolved} conflicts left unresolved, both files kept");
    }

    cleanup::relocate_all(&moves, root, settings);

    info!(
        "organized {} tracks ({} conflicts)",
        moves.len(),
        conflicts.len()
    );
    Ok(())
}

/// Partition tracks by their exact album string. The empty string is its own
/// group, meaning "unknown album".
fn group_by_album(tracks: Vec<Track>) -> HashMap<String, Vec<Track>> {
    let mut groups: HashMap<String, Vec<Track>> = HashMap::new();
    for track in tracks {
        groups.entry(track.album.clone()).or_default().push(track);
    }
    groups
}

fn organize_album(
    album: &str,
    tracks: Vec<Track>,
    root: &Path,
    settings: &OrganizeSettings,
) -> AlbumOutcome {
    let mut outcome = AlbumOutcome::default();

    if album.trim().is_empty() {
        // No album to aggregate over: every track is its own pseudo-album.
        for track in tracks {
            let resolved = artist::resolve_single_artist(&track, settings.use_album_artist);
            let ctx = AlbumContext {
                root,
                artist: &resolved.name,
                use_artist_subdirectory: resolved.use_artist_subdirectory,
                total_discs: None,
                disc_subdirectories: settings.disc_subdirectories,
            };
            apply_plan(track, album, &ctx, &mut outcome);
        }
        return outcome;
    }

    let resolved = artist::resolve_album_artist(&tracks, settings.use_album_artist);
    let total_discs = tracks
        .iter()
        .map(|t| t.disc_number.unwrap_or(1))
        .max()
        .unwrap_or(1)
        .max(1);
    let ctx = AlbumContext {
        root,
        artist: &resolved.name,
        use_artist_subdirectory: resolved.use_artist_subdirectory,
        total_discs: Some(total_discs),
        disc_subdirectories: settings.disc_subdirectories,
    };

    for track in tracks {
        apply_plan(track, album, &ctx, &mut outcome);
    }
    outcome
}

/// Plan one track and carry the plan out: persist backfilled disc tags, then
/// move the file, register a conflict, or do nothing when it is already in
/// place. Any per-track failure is logged and skips just this track.
fn apply_plan(track: Track, album: &str, ctx: &AlbumContext, outcome: &mut AlbumOutcome) {
    let original_path = track.path.clone();
    let plan = plan::plan_track(&track, album, ctx);

    if plan.needs_tag_save {
        if let Err(e) = tags::save_disc_tags(&plan.track) {
            warn!(path = %original_path.display(), error = %e, "failed to write disc tags, skipping");
            return;
        }
    }

    if fsutil::paths_equal(&plan.destination, &original_path) {
        return;
    }

    if plan.destination.exists() {
        outcome.conflicts.push(TrackConflict {
            track: plan.track,
            existing_path: plan.destination,
        });
        return;
    }

    let Some(new_dir) = plan.destination.parent().map(Path::to_path_buf) else {
        return;
    };
    if let Err(e) = fs::create_dir_all(&new_dir) {
        warn!(path = %new_dir.display(), error = %e, "failed to create directory, skipping");
        return;
    }

    let Some(original_dir) = original_path.parent().map(Path::to_path_buf) else {
        return;
    };

    if fsutil::move_file(&original_path, &plan.destination, false) {
        outcome.moves.push(MoveRecord {
            original_dir,
            new_dir,
            new_path: plan.destination,
        });
    }
}
