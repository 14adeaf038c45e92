//! Diagnostics for the hook process.
//!
//! Stdout is reserved for the decision object, so logs go to
//! `~/.deep-review/logs/review-hook.log` (stderr if that is not writable).
//!
//! - `REVIEW_HOOK_LOG`: full `EnvFilter` directive, e.g. `review_core=debug`
//! - `REVIEW_HOOK_DEBUG=1`: shorthand for `debug`
//! - default: `info`

use std::env;
use std::path::PathBuf;

use fs_err as fs;
use review_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "REVIEW_HOOK_LOG";
const DEBUG_ENV: &str = "REVIEW_HOOK_DEBUG";

fn build_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(FILTER_ENV) {
        return filter;
    }
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

fn log_file() -> Option<(PathBuf, String)> {
    let path = StorageConfig::from_env().ok()?.hook_log_file();
    let dir = path.parent()?.to_path_buf();
    let name = path.file_name()?.to_str()?.to_string();
    fs::create_dir_all(&dir).ok()?;
    Some((dir, name))
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let filter = build_filter();

    match log_file() {
        Some((dir, name)) => {
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}
