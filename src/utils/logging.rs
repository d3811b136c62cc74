//! Log file set-up.
//!
//! The terminal belongs to the UI, so tracing output goes to a file instead of stderr.
//! The filter is read from `FERRULE_LOG` and defaults to `info`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FERRULE_LOG";

/// Installs the global tracing subscriber writing to `path`.
///
/// Parent directories are created as needed and the file is appended to.
pub fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(log_file))
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))
}
