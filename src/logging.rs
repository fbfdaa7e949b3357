//! Tracing setup: human-readable stdout plus an append-only log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::{Error, Result};

pub const DEFAULT_LOG_FILE: &str = "app.log";
pub const DEFAULT_DIRECTIVE: &str = "daily_english_bot=info";

/// `RUST_LOG` plus the crate's default level.
pub fn env_filter() -> Result<EnvFilter> {
    let directive = DEFAULT_DIRECTIVE
        .parse()
        .map_err(|e| Error::Config(format!("invalid log directive: {}", e)))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Open the log file for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. Call once at startup.
pub fn init(log_file: &Path) -> Result<()> {
    let file = open_log_file(log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(env_filter()?))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(env_filter()?),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialise logging: {}", e)))
}
