use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;

/// Log filter applied when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Events go to stderr so command output on stdout stays clean. When
/// `log_dir` is given, events are also written to a timestamped file in it,
/// and that file's path is returned.
pub fn setup_logging(log_dir: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            Some(dir.join(format!("microrobot_dataset_{}.log", timestamp)))
        }
        None => None,
    };

    let file_layer = match &log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .event_format(BracketedFormatter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    let stderr_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    if let Some(path) = &log_path {
        info!("Log file created at: {:?}", path);
    }

    Ok(log_path)
}
