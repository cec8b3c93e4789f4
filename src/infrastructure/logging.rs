//! File-backed tracing setup
//!
//! The terminal belongs to the TUI, so log output goes to a file in the data
//! directory through a non-blocking writer.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "soulboard.log";

/// Pick the filter: explicit flag, then `RUST_LOG`, then config, then `info`.
pub fn build_filter(flag: Option<&str>, config: Option<&str>) -> EnvFilter {
    if let Some(filter) = flag.and_then(|f| EnvFilter::try_new(f).ok()) {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    config
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber. Keep the guard alive until exit so the
/// writer flushes. Returns `None` if the directory cannot be used.
pub fn init(dir: &Path, filter: EnvFilter) -> Option<WorkerGuard> {
    fs::create_dir_all(dir).ok()?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_config() {
        let filter = build_filter(Some("debug"), Some("warn"));
        assert_eq!(filter.to_string(), "debug");
    }
}
