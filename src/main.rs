use std::env;
use std::path::Path;
use std::process::ExitCode;

use anyhow::anyhow;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod cleanup;
mod config;
mod conflict;
mod fsutil;
mod library;
mod organize;
mod transcode;

#[cfg(test)]
mod testutil;

use config::Settings;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let root = match env::args().nth(1) {
        Some(arg) if Path::new(&arg).is_dir() => arg,
        _ => {
            eprintln!("usage: dacapo <music-directory>");
            return ExitCode::from(2);
        }
    };

    match run(Path::new(&root)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(root: &Path) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    settings.validate().map_err(|e| anyhow!(e))?;

    organize::run(root, &settings)?;

    if settings.transcode.enabled {
        transcode::compress_lossless(root, &settings)?;
    }

    Ok(())
}
