//! Helpers for building small but real audio files in tests.

use std::fs;
use std::path::Path;

use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::tag::{Tag, TagType};

/// Write a minimal valid mono 16-bit PCM WAV file.
///
/// The audio bitrate lofty reports is `sample_rate * 16 / 1000` kbps, so
/// tests pick sample rates to steer quality comparisons (8000 Hz -> 128
/// kbps, 20000 Hz -> 320 kbps).
pub fn write_wav(path: &Path, sample_rate: u32, millis: u64) {
    let byte_rate = sample_rate * 2;
    let data_len = ((byte_rate as u64 * millis / 1000) & !1) as u32;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    fs::write(path, bytes).unwrap();
}

/// Tag fields to stamp onto a generated WAV (as ID3v2).
#[derive(Debug, Default)]
pub struct WavTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track: Option<u32>,
    pub year: Option<u32>,
}

impl WavTags {
    pub fn apply(&self, path: &Path) {
        let mut tag = Tag::new(TagType::Id3v2);
        if let Some(title) = &self.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &self.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &self.album {
            tag.set_album(album.clone());
        }
        if let Some(album_artist) = &self.album_artist {
            tag.insert_text(ItemKey::AlbumArtist, album_artist.clone());
        }
        if let Some(track) = self.track {
            tag.set_track(track);
        }
        if let Some(year) = self.year {
            tag.set_year(year);
        }
        tag.save_to_path(path, WriteOptions::default()).unwrap();
    }
}
