//! The metadata collaborator: reading a [`Track`] snapshot out of a file's
//! tag storage and writing backfilled disc numbers back.

use std::path::Path;

use anyhow::{Context, Result, bail};
use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;

use super::model::Track;

/// Read a metadata snapshot for the audio file at `path`.
///
/// A missing tag is not an error: audio properties still populate bitrate
/// and duration, and the title falls back to the file name stem (the same
/// fallback an untagged file gets from most tag libraries).
pub fn load_track(path: &Path) -> Result<Track> {
    let tagged = Probe::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .read()
        .with_context(|| format!("failed to read tags from {}", path.display()))?;

    let properties = tagged.properties();

    let mut track = Track {
        path: path.to_path_buf(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string(),
        bitrate: properties.audio_bitrate().unwrap_or(0),
        duration_ms: properties.duration().as_millis() as u64,
        bit_depth: properties.bit_depth(),
        format: format!("{:?}", tagged.file_type()),
        ..Track::default()
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(title) = tag.title() {
            if !title.trim().is_empty() {
                track.title = title.to_string();
            }
        }
        track.artist = tag.artist().as_deref().unwrap_or("").to_string();
        track.album = tag.album().as_deref().unwrap_or("").to_string();
        track.album_artist = tag.get_string(&ItemKey::AlbumArtist).unwrap_or("").to_string();
        track.original_artist = tag
            .get_string(&ItemKey::OriginalArtist)
            .unwrap_or("")
            .to_string();
        track.composer = tag.get_string(&ItemKey::Composer).unwrap_or("").to_string();
        track.conductor = tag.get_string(&ItemKey::Conductor).unwrap_or("").to_string();
        track.track_number = tag.track();
        track.disc_number = tag.disk();
        track.disc_total = tag.disk_total();
        track.year = tag.year();
    }

    Ok(track)
}

/// Persist a track's disc number and disc total back into its tag storage.
///
/// Only the disc fields are written; everything else in the file's tag is
/// left as found. Creates a tag of the file's primary type when the file
/// carries none.
pub fn save_disc_tags(track: &Track) -> Result<()> {
    let mut tagged = Probe::open(&track.path)
        .with_context(|| format!("failed to open {}", track.path.display()))?
        .read()
        .with_context(|| format!("failed to read tags from {}", track.path.display()))?;

    if tagged.primary_tag().is_none() {
        let tag_type = tagged.primary_tag_type();
        tagged.insert_tag(Tag::new(tag_type));
    }

    let Some(tag) = tagged.primary_tag_mut() else {
        bail!("no writable tag for {}", track.path.display());
    };

    if let Some(disc) = track.disc_number {
        tag.set_disk(disc);
    }
    if let Some(total) = track.disc_total {
        tag.set_disk_total(total);
    }

    tag.save_to_path(&track.path, WriteOptions::default())
        .with_context(|| format!("failed to save tags to {}", track.path.display()))?;
    Ok(())
}
