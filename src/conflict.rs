//! Destination-path collisions and their quality-based resolution.
//!
//! A conflict is a track whose computed destination is already occupied by a
//! different file. Conflicts accumulate during the organizing pass, are
//! deduplicated, then resolved one by one: the higher-bitrate file wins the
//! path, unless the two files disagree on duration badly enough that they
//! are probably not the same recording at all.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::fsutil;
use crate::library::{Track, tags};

/// Durations within this tolerance are treated as "the same recording".
const DURATION_TOLERANCE_MS: u64 = 1000;

/// A pending collision: `track` wants to occupy `existing_path`, where some
/// other file already resides.
#[derive(Debug, Clone)]
pub struct TrackConflict {
    pub track: Track,
    pub existing_path: PathBuf,
}

impl TrackConflict {
    /// Symmetric presence check: two conflicts describe the same collision
    /// when either one's candidate path is the other's occupied destination.
    ///
    /// Deliberately not an `Eq`/`Hash` impl: the relation is symmetric but
    /// not transitive, so it only supports pairwise dedup, not set identity.
    pub fn overlaps(&self, other: &TrackConflict) -> bool {
        fsutil::paths_equal(&self.track.path, &other.existing_path)
            || fsutil::paths_equal(&other.track.path, &self.existing_path)
    }
}

/// Drop every conflict that overlaps an earlier one, scanning from the end
/// backward so the earliest of each overlapping pair survives.
pub fn dedup_conflicts(mut conflicts: Vec<TrackConflict>) -> Vec<TrackConflict> {
    let mut i = conflicts.len();
    while i > 0 {
        i -= 1;
        if conflicts[..i].iter().any(|earlier| conflicts[i].overlaps(earlier)) {
            conflicts.remove(i);
        }
    }
    conflicts
}

/// Resolve one conflict. Returns whether the collision was settled (one file
/// survived); `false` leaves both files on disk.
pub fn resolve(conflict: &TrackConflict) -> bool {
    let existing = match tags::load_track(&conflict.existing_path) {
        Ok(track) => track,
        Err(e) => {
            warn!(
                path = %conflict.existing_path.display(),
                error = %e,
                "failed to load existing track, leaving conflict unresolved"
            );
            return false;
        }
    };

    choose_best_quality(&conflict.track, &existing)
}

/// The single-winner quality policy: keep whichever of the two files has the
/// higher bitrate. No ranking beyond this pair is attempted.
fn choose_best_quality(candidate: &Track, existing: &Track) -> bool {
    let has_zero_bitrate = candidate.bitrate == 0 || existing.bitrate == 0;
    let duration_delta_ms = candidate.duration_ms.abs_diff(existing.duration_ms);

    if !has_zero_bitrate && duration_delta_ms > DURATION_TOLERANCE_MS {
        warn!(
            "tracks at the same destination have different durations (difference: {}ms)\n{}\n{}",
            duration_delta_ms,
            describe(candidate),
            describe(existing),
        );
        return false;
    }

    if existing.bitrate < candidate.bitrate {
        if !fsutil::move_file(&candidate.path, &existing.path, true) {
            return false;
        }
        info!(
            "replaced lower quality track ({}kbps vs {}kbps) at {}",
            existing.bitrate,
            candidate.bitrate,
            existing.path.display()
        );
        return true;
    }

    // The existing file is at least as good; the candidate goes.
    match fsutil::remove_file_force(&candidate.path) {
        Ok(()) => {
            info!(
                "deleted lower quality duplicate ({}kbps vs {}kbps) {}",
                candidate.bitrate,
                existing.bitrate,
                candidate.path.display()
            );
            true
        }
        Err(e) => {
            warn!(
                path = %candidate.path.display(),
                error = %e,
                "failed to delete duplicate"
            );
            false
        }
    }
}

fn describe(track: &Track) -> String {
    let mut s = format!(
        "({}s {} {}kbps",
        track.duration_ms / 1000,
        track.format,
        track.bitrate
    );
    if let Some(depth) = track.bit_depth {
        s.push_str(&format!(" {depth}bit"));
    }
    s.push_str(&format!(
        ") || [\"{} - {:02}. {}\"] || {}",
        track.artist,
        track.track_number.unwrap_or(0),
        track.title,
        track.path.display()
    ));
    s
}
