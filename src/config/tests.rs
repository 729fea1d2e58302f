use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_dacapo_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("DACAPO_CONFIG_PATH", "/tmp/dacapo-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/dacapo-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("dacapo")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("dacapo")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_the_documented_policy() {
    let s = Settings::default();
    assert!(s.organize.use_album_artist);
    assert!(!s.organize.disc_subdirectories);
    assert_eq!(
        s.organize.ignore_directories,
        vec![".stfolder".to_string(), ".stversions".to_string()]
    );
    assert_eq!(s.organize.protected_directories, vec!["slskd".to_string()]);
    assert!(s.library.extensions.contains(&"flac".to_string()));
    assert!(s.library.lossless_extensions.contains(&"wav".to_string()));
    assert!(!s.library.include_hidden);
    assert!(!s.transcode.enabled);
    assert_eq!(s.transcode.bitrate_threshold_kbps, 900);
    assert_eq!(s.transcode.compression_level, 8);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[organize]
use_album_artist = false
disc_subdirectories = true
ignore_directories = [".sync"]
protected_directories = ["seedbox"]

[library]
extensions = ["mp3", "flac"]
lossless_extensions = ["flac"]
include_hidden = true

[transcode]
enabled = true
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
bitrate_threshold_kbps = 700
compression_level = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("DACAPO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("DACAPO__TRANSCODE__ENABLED");

    let s = Settings::load().unwrap();
    assert!(!s.organize.use_album_artist);
    assert!(s.organize.disc_subdirectories);
    assert_eq!(s.organize.ignore_directories, vec![".sync".to_string()]);
    assert_eq!(s.organize.protected_directories, vec!["seedbox".to_string()]);
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "flac".to_string()]);
    assert_eq!(s.library.lossless_extensions, vec!["flac".to_string()]);
    assert!(s.library.include_hidden);
    assert!(s.transcode.enabled);
    assert_eq!(s.transcode.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(s.transcode.bitrate_threshold_kbps, 700);
    assert_eq!(s.transcode.compression_level, 5);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[transcode]
bitrate_threshold_kbps = 900
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("DACAPO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("DACAPO__TRANSCODE__BITRATE_THRESHOLD_KBPS", "450");

    let s = Settings::load().unwrap();
    assert_eq!(s.transcode.bitrate_threshold_kbps, 450);
}

#[test]
fn validate_rejects_out_of_range_compression_level() {
    let mut s = Settings::default();
    s.transcode.compression_level = 13;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.library.extensions.clear();
    assert!(s.validate().is_err());
}
