use std::path::PathBuf;

/// A point-in-time snapshot of one audio file and its embedded metadata.
///
/// The file on disk is the source of truth; a snapshot goes stale once the
/// file moves. String fields are empty when the tag field is absent.
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub disc_total: Option<u32>,
    pub album: String,
    pub artist: String,
    pub album_artist: String,
    pub original_artist: String,
    pub composer: String,
    pub conductor: String,
    pub year: Option<u32>,
    /// Audio bitrate in kbps. 0 means unknown, which for some container
    /// formats signals a corrupt or incomplete file.
    pub bitrate: u32,
    pub duration_ms: u64,
    pub bit_depth: Option<u8>,
    /// Short container/codec name, for log lines only.
    pub format: String,
}
