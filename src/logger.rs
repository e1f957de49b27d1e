use std::path::Path;

use eyre::{Result, WrapErr};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Setup logging for the application
///
/// Log messages are written to stdout and, if `log_file` is given, to that file without
/// colors. The level is one of `trace`, `debug`, `info`, `warn` or `error`, or any
/// [EnvFilter] directive.
///
/// A global subscriber can only be set once, later calls leave the first one in place and
/// do not touch `log_file`.
pub fn setup_log(log_level: &str, log_file: Option<&Path>) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("Logging was already configured");
        return Ok(());
    }
    let log_level = log_level.to_lowercase();
    let env_filter = EnvFilter::new(&log_level);

    // Define a registry with that level as an environment filter
    let subscriber = Registry::default().with(env_filter);

    // Define a layer for the log file
    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Could not create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_timer(CompactTimestamp);
            Some(layer)
        }
        None => None,
    };

    // Define layer for stdout
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false)
        .with_timer(CompactTimestamp);

    // Combine layers with subscriber
    if subscriber
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging was already configured");
        return Ok(());
    }
    tracing::debug!("Logging is configured with level: {}", log_level);
    Ok(())
}

#[derive(Clone)]
struct CompactTimestamp;

impl FormatTime for CompactTimestamp {
    fn format_time(
        &self,
        w: &mut tracing_subscriber::fmt::format::Writer<'_>,
    ) -> Result<(), std::fmt::Error> {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_logging_keeps_log_file_untouched() {
        setup_log("warn", None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs").join("run.log");
        setup_log("debug", Some(&log)).unwrap();
        assert!(!log.exists());
        assert!(!dir.path().join("logs").exists());
    }
}
