use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/dacapo/config.toml` or `~/.config/dacapo/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `DACAPO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub organize: OrganizeSettings,
    pub library: LibrarySettings,
    pub transcode: TranscodeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrganizeSettings {
    /// Prefer the album-artist tag over the track artist when naming the
    /// artist directory.
    pub use_album_artist: bool,
    /// Put each disc of a multi-disc album into its own "Disc N" directory.
    pub disc_subdirectories: bool,
    /// Directory names to leave entirely alone (not scanned, not pruned).
    pub ignore_directories: Vec<String>,
    /// Directory names never deleted by the empty-directory sweep.
    pub protected_directories: Vec<String>,
}

impl Default for OrganizeSettings {
    fn default() -> Self {
        Self {
            use_album_artist: true,
            disc_subdirectories: false,
            ignore_directories: vec![".stfolder".into(), ".stversions".into()],
            protected_directories: vec!["slskd".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Extensions considered lossless and eligible for re-encoding.
    pub lossless_extensions: Vec<String>,
    /// Whether to descend into hidden directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "flac".into(),
                "mp3".into(),
                "m4a".into(),
                "aac".into(),
                "ogg".into(),
                "opus".into(),
                "wav".into(),
                "mp1".into(),
                "mp2".into(),
                "aax".into(),
                "caf".into(),
                "m4b".into(),
                "mp4".into(),
                "mid".into(),
                "oga".into(),
                "tak".into(),
                "bwav".into(),
                "bwf".into(),
                "vgm".into(),
                "vgz".into(),
                "wv".into(),
                "wma".into(),
                "asf".into(),
            ],
            lossless_extensions: vec![
                "flac".into(),
                "wav".into(),
                "tak".into(),
                "bwav".into(),
                "bwf".into(),
                "vgm".into(),
                "vgz".into(),
                "wv".into(),
            ],
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscodeSettings {
    /// Whether to re-encode oversized lossless files after organizing.
    pub enabled: bool,
    /// Path or name of the ffmpeg binary.
    pub ffmpeg_path: String,
    /// Files at or below this bitrate are left alone (kbps).
    pub bitrate_threshold_kbps: u32,
    /// FLAC compression level passed to ffmpeg (0-12).
    pub compression_level: u8,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ffmpeg_path: "ffmpeg".into(),
            bitrate_threshold_kbps: 900,
            compression_level: 8,
        }
    }
}
