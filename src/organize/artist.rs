//! Deciding which artist name represents an album.

use std::collections::{HashMap, HashSet};

use crate::library::Track;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// The artist-level decision for one album: the directory name and whether
/// an artist subdirectory is used at all. The flag is always true under the
/// current policy but stays a separate decision from the name itself.
#[derive(Debug, Clone)]
pub struct ResolvedArtist {
    pub name: String,
    pub use_artist_subdirectory: bool,
}

/// The effective artist string for one track.
///
/// The primary field (album-artist or track artist, per configuration) wins
/// when non-blank; otherwise the alternate of the pair, then original
/// artist, composer and conductor, and finally the "Unknown Artist"
/// placeholder.
pub fn effective_artist(track: &Track, use_album_artist: bool) -> String {
    let (primary, alternate) = if use_album_artist {
        (&track.album_artist, &track.artist)
    } else {
        (&track.artist, &track.album_artist)
    };

    for candidate in [
        primary,
        alternate,
        &track.original_artist,
        &track.composer,
        &track.conductor,
    ] {
        if !candidate.trim().is_empty() {
            return candidate.clone();
        }
    }

    UNKNOWN_ARTIST.to_string()
}

/// Split an artist string on `;` into trimmed, non-blank sub-artists.
fn sub_artists(artist: &str) -> impl Iterator<Item = &str> {
    artist.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Resolve the representative artist for a named album from all its tracks.
///
/// Sub-artists are deduplicated case-insensitively, preferring the variant
/// that starts with an uppercase letter. The policy by distinct cardinality:
/// none -> "Unknown Artist"; one -> that artist; more than four -> "Various
/// Artists"; otherwise the two most frequent sub-artists (counted across all
/// tracks, pre-dedup) are compared, and a tie means "Various Artists".
pub fn resolve_album_artist(tracks: &[Track], use_album_artist: bool) -> ResolvedArtist {
    let mut originals: Vec<String> = Vec::new();
    for track in tracks {
        let artist = effective_artist(track, use_album_artist);
        originals.extend(sub_artists(&artist).map(str::to_string));
    }

    // Case-insensitive dedup, uppercase-leading variants first so they win.
    let mut ordered = originals.clone();
    ordered.sort_by_key(|a| !a.chars().next().is_some_and(char::is_uppercase));
    let mut seen = HashSet::new();
    let distinct: Vec<String> = ordered
        .into_iter()
        .filter(|a| seen.insert(a.to_lowercase()))
        .collect();

    let name = match distinct.len() {
        0 => UNKNOWN_ARTIST.to_string(),
        1 => distinct.into_iter().next().unwrap_or_default(),
        n if n > 4 => VARIOUS_ARTISTS.to_string(),
        _ => most_frequent_or_various(&originals),
    };

    ResolvedArtist {
        name,
        use_artist_subdirectory: true,
    }
}

fn most_frequent_or_various(originals: &[String]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for artist in originals {
        *counts.entry(artist.as_str()).or_insert(0) += 1;
    }

    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    match sorted.as_slice() {
        [] => UNKNOWN_ARTIST.to_string(),
        [(only, _)] => (*only).to_string(),
        [(first, first_count), (_, second_count), ..] => {
            if first_count == second_count {
                VARIOUS_ARTISTS.to_string()
            } else {
                (*first).to_string()
            }
        }
    }
}

/// Resolve an artist for one track of the "unknown album" case, where each
/// track is its own pseudo-album and no cross-track aggregation applies.
pub fn resolve_single_artist(track: &Track, use_album_artist: bool) -> ResolvedArtist {
    let artist = effective_artist(track, use_album_artist);
    let parts: Vec<&str> = sub_artists(&artist).collect();

    let name = match parts.as_slice() {
        [] => UNKNOWN_ARTIST.to_string(),
        [only] => (*only).to_string(),
        _ => VARIOUS_ARTISTS.to_string(),
    };

    ResolvedArtist {
        name,
        use_artist_subdirectory: true,
    }
}
