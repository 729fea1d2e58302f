//! Re-encoding oversized lossless files to FLAC via an external ffmpeg.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Settings;
use crate::fsutil;
use crate::library::{scan, tags};

/// Re-encode every lossless file under `root` whose bitrate exceeds the
/// configured threshold. Per-file failures are logged and leave the
/// original untouched.
pub fn compress_lossless(root: &Path, settings: &Settings) -> anyhow::Result<()> {
    let candidates = scan::find_lossless_files(
        root,
        &settings.library,
        &settings.organize.ignore_directories,
    );
    info!(
        "checking {} lossless files for re-encoding",
        candidates.len()
    );

    candidates.par_iter().for_each(|path| {
        if let Err(e) = compress_file(path, settings) {
            warn!(path = %path.display(), error = %e, "re-encode failed");
        }
    });

    Ok(())
}

fn compress_file(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    // The file may have been moved or deleted since enumeration.
    if !path.exists() {
        return Ok(());
    }

    let track = tags::load_track(path)?;
    if track.bitrate == 0 {
        // No decodable audio stream. A broken FLAC is not worth keeping.
        if path.extension().is_some_and(|e| e == "flac") {
            warn!(path = %path.display(), "removing flac with no audio stream");
            fsutil::remove_file_force(path)?;
        }
        return Ok(());
    }
    if track.bitrate <= settings.transcode.bitrate_threshold_kbps {
        return Ok(());
    }

    let output = path.with_extension("flac");

    // Re-encoding a FLAC in place needs the input out of the way first.
    let mut input = path.to_path_buf();
    let mut renamed_in_place = false;
    if fsutil::paths_equal(&input, &output) {
        input = temp_sibling(path);
        if !fsutil::move_file(path, &input, false) {
            bail!("could not stage {} for re-encoding", path.display());
        }
        renamed_in_place = true;
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        bitrate = track.bitrate,
        "re-encoding to flac"
    );

    let result = Command::new(&settings.transcode.ffmpeg_path)
        .arg("-i")
        .arg(&input)
        .args(["-codec:a", "flac", "-compression_level"])
        .arg(settings.transcode.compression_level.to_string())
        .arg(&output)
        .output()
        .with_context(|| format!("failed to spawn {}", settings.transcode.ffmpeg_path))?;

    if result.status.success() && encoded_ok(&output) {
        if finalize_encode(&input, &output)? {
            return Ok(());
        }
        info!(path = %path.display(), "re-encode grew the file, keeping the original");
        if renamed_in_place {
            fsutil::move_file(&input, path, false);
        }
        return Ok(());
    }

    // Roll back: drop the partial output and restore an in-place input.
    if output.exists() {
        if let Err(e) = fsutil::remove_file_force(&output) {
            warn!(path = %output.display(), error = %e, "failed to remove partial output");
        }
    }
    if renamed_in_place {
        fsutil::move_file(&input, path, false);
    }
    bail!(
        "ffmpeg exited with {}: {}",
        result.status,
        String::from_utf8_lossy(&result.stderr).trim()
    );
}

/// Keep whichever of the two files is smaller. Returns whether the encoded
/// output survived; a flac-to-flac pass can come out larger than it went in.
fn finalize_encode(input: &Path, output: &Path) -> anyhow::Result<bool> {
    let input_len = fs::metadata(input)?.len();
    let output_len = fs::metadata(output)?.len();
    if output_len > input_len {
        fsutil::remove_file_force(output)?;
        return Ok(false);
    }
    fsutil::remove_file_force(input)?;
    Ok(true)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("track");
    path.with_file_name(format!("{stem}-temp.flac"))
}

/// A successful encode must be readable as audio, not just present.
fn encoded_ok(output: &Path) -> bool {
    if !output.exists() {
        return false;
    }
    match tags::load_track(output) {
        Ok(track) => track.bitrate > 0,
        Err(e) => {
            warn!(path = %output.display(), error = %e, "re-encoded file is unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::tempdir;

    use super::{compress_file, finalize_encode, temp_sibling};
    use crate::config::Settings;
    use crate::testutil::write_wav;

    #[test]
    fn temp_sibling_stays_in_the_same_directory() {
        assert_eq!(
            temp_sibling(Path::new("/m/a/song.flac")),
            Path::new("/m/a/song-temp.flac")
        );
    }

    #[test]
    fn missing_file_is_skipped() {
        let dir = tempdir().unwrap();
        let settings = Settings::default();
        compress_file(&dir.path().join("gone.flac"), &settings).unwrap();
    }

    #[test]
    fn below_threshold_files_are_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quiet.wav");
        // 128 kbps, well under the default 900 kbps threshold.
        write_wav(&path, 8000, 1000);

        compress_file(&path, &Settings::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn larger_encode_output_is_discarded() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.wav");
        let output = dir.path().join("song.flac");
        write_wav(&input, 8000, 1000);
        write_wav(&output, 8000, 3000);

        assert!(!finalize_encode(&input, &output).unwrap());
        assert!(input.exists());
        assert!(!output.exists());
    }

    #[test]
    fn smaller_encode_output_replaces_the_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("song.wav");
        let output = dir.path().join("song.flac");
        write_wav(&input, 8000, 3000);
        write_wav(&output, 8000, 1000);

        assert!(finalize_encode(&input, &output).unwrap());
        assert!(!input.exists());
        assert!(output.exists());
    }
}
