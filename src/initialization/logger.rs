//! Logger initialization.
//!
//! Configures `env_logger` with plain (coloured) or JSON formatting, writing to
//! stderr or appending to a log file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format, on stderr.
///
/// The logger reads `RUST_LOG` first and the provided `level` overrides it, so
/// `RUST_LOG=sqlx=debug` still works for per-module tuning.
///
/// Below-threshold matches are logged at `debug` under `ct_monitor::diagnostic`:
///
/// ```bash
/// # Show only diagnostics on top of the normal info output
/// RUST_LOG=ct_monitor::diagnostic=debug ct_monitor --search-pattern 'paypal|login'
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);
    let mut builder = builder_with(level, format);
    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

/// Same as [`init_logger_with`], appending to `path` instead of stderr.
///
/// The file is created if needed; colours are disabled. Rotation is left to
/// the host (logrotate with `copytruncate`, for example).
pub fn init_logger_to_file(
    level: LevelFilter,
    format: LogFormat,
    path: &Path,
) -> Result<(), InitializationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            InitializationError::LoggerSetupError(format!(
                "cannot create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            InitializationError::LoggerSetupError(format!(
                "cannot open log file {}: {e}",
                path.display()
            ))
        })?;

    colored::control::set_override(false);
    let mut builder = builder_with(level, format);
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

fn builder_with(level: LevelFilter, format: LogFormat) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("ct_monitor", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    builder
}
