use crate::config::LoggingConfig;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes console logging, plus a daily rolling JSON file when a log
/// directory is configured.
///
/// Keep the returned guard alive for the life of the process so buffered
/// file output is flushed on exit.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // Respect RUST_LOG if set; otherwise fall back to the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let log_dir = prepare_log_dir(config);
    let (file_layer, guard) = match &log_dir {
        Ok(Some(dir)) => {
            let file_appender = tracing_appender::rolling::daily(dir, "pokedex.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(fmt::layer().json().with_writer(non_blocking_writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // Reported once the console layer exists to carry it
    if let Err(error) = log_dir {
        warn!(
            directory = ?config.directory,
            %error,
            "Could not create log directory; file logging disabled"
        );
    }

    guard
}

/// Creates the configured log directory. `Ok(None)` when file logging is off.
fn prepare_log_dir(config: &LoggingConfig) -> io::Result<Option<&Path>> {
    match &config.directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            Ok(Some(dir.as_path()))
        }
        None => Ok(None),
    }
}
