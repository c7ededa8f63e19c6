//! Tracing setup: JSON log file plus warnings on stderr.
//!
//! Standard output belongs to the chat transcript, so only warnings reach the
//! terminal. The full log goes to a daily rolling file under the data
//! directory, filtered by `RUST_LOG` (default [`DEFAULT_FILTER`]).

use std::path::Path;

use tracing::{info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Used when `RUST_LOG` is unset.
pub(crate) const DEFAULT_FILTER: &str = "viki=debug,viki_core=debug";

const MAX_LOG_FILES: usize = 5;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process logs.
pub(crate) fn init(log_dir: &Path) -> Option<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("viki")
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir);

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let file_layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter());

            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_filter(LevelFilter::WARN);

            tracing_subscriber::registry()
                .with(file_layer)
                .with(console_layer)
                .init();

            info!(log_dir = %log_dir.display(), "Logger initialized");
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();

            warn!(log_dir = %log_dir.display(), error = %e, "Log file unavailable, logging to stderr");
            None
        }
    }
}
