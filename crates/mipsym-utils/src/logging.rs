//! # Logging Utilities
//!
//! Logging infrastructure for mipsym using `tracing`.
//!
//! Logs go to stderr so that anything a tool prints on stdout stays clean
//! enough to pipe somewhere else. This module provides:
//! - Pretty (human-readable) and JSON output
//! - Environment variable configuration
//! - Optional mirroring to a log file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mipsym_utils::init_logging;
//!
//! // Reads RUST_LOG, MIPSYM_LOG_FORMAT and MIPSYM_LOG_FILE
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! Keep the returned [`LoggingGuard`] alive until the program exits, otherwise
//! buffered file output may be lost.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=mipsym_core=trace`)
//! - `MIPSYM_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `MIPSYM_LOG_FILE`: Optional log file. A file path rolls over daily; a
//!   directory gets one `YYYY-MM-DD-mipsym.log` file per run date.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "MIPSYM_LOG_FORMAT";

/// Environment variable naming an optional log file or directory.
pub const LOG_FILE_ENV: &str = "MIPSYM_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Keeps the background log file writer running. Dropping it flushes and
/// stops file output.
#[derive(Debug)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// - `RUST_LOG`: Filter directives; defaults to `info`
/// - `MIPSYM_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `MIPSYM_LOG_FILE`: Optional log file or directory
///
/// ## Example
///
/// ```rust,no_run
/// use mipsym_utils::init_logging;
///
/// let _guard = init_logging().expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
///
/// ## Errors
///
/// Returns an error if:
/// - `MIPSYM_LOG_FORMAT` is set to something unknown
/// - Logging is already initialized
/// - The log file can't be set up
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    let format = format_from_env(std::env::var(LOG_FORMAT_ENV).ok().as_deref())?;

    // RUST_LOG can override the default level with more specific filters
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    init_logging_internal(format, filter)
}

/// Initialize logging with an explicit level, ignoring `RUST_LOG`
///
/// `MIPSYM_LOG_FILE` is still honoured.
///
/// ## Example
///
/// ```rust,no_run
/// use mipsym_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init_logging_internal(format, EnvFilter::new(Level::from(level).to_string()))
}

fn format_from_env(value: Option<&str>) -> Result<LogFormat, LoggingError>
{
    value.map_or(Ok(LogFormat::default()), LogFormat::from_str)
}

fn init_logging_internal(format: LogFormat, filter: EnvFilter) -> Result<LoggingGuard, LoggingError>
{
    let log_file = std::env::var_os(LOG_FILE_ENV).map(PathBuf::from);

    let mut layers = vec![console_layer(format, filter.clone())];
    let file_guard = match log_file {
        Some(path) => {
            let (layer, guard) = file_layer(&path, format, filter)?;
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(path: &Path, format: LogFormat, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard), LoggingError>
{
    let (directory, file_name, daily) = log_file_target(path, &Utc::now().format("%Y-%m-%d").to_string());
    std::fs::create_dir_all(&directory)?;

    let appender = if daily {
        tracing_appender::rolling::daily(&directory, &file_name)
    } else {
        tracing_appender::rolling::never(&directory, &file_name)
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    };
    Ok((layer, guard))
}

/// Split `MIPSYM_LOG_FILE` into a directory, a file name and whether the file
/// rolls over daily.
fn log_file_target(path: &Path, today: &str) -> (PathBuf, String, bool)
{
    if path.is_dir() || path.as_os_str().to_string_lossy().ends_with(['/', '\\']) {
        return (path.to_path_buf(), format!("{today}-mipsym.log"), false);
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map_or_else(|| "mipsym.log".to_string(), |name| name.to_string_lossy().into_owned());
    (directory, file_name, true)
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Pretty);
        assert!(matches!(
            LogFormat::from_str("invalid"),
            Err(LoggingError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_format_from_env()
    {
        assert_eq!(format_from_env(None).unwrap(), LogFormat::Pretty);
        assert_eq!(format_from_env(Some("json")).unwrap(), LogFormat::Json);
        assert!(format_from_env(Some("xml")).is_err());
    }

    #[test]
    fn test_log_file_target()
    {
        let (directory, file_name, daily) = log_file_target(Path::new("logs/mipsym.log"), "2026-01-02");
        assert_eq!(directory, PathBuf::from("logs"));
        assert_eq!(file_name, "mipsym.log");
        assert!(daily);

        let (directory, file_name, daily) = log_file_target(Path::new("mipsym.log"), "2026-01-02");
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, "mipsym.log");
        assert!(daily);

        let (directory, file_name, daily) = log_file_target(Path::new("logs/"), "2026-01-02");
        assert_eq!(directory, PathBuf::from("logs/"));
        assert_eq!(file_name, "2026-01-02-mipsym.log");
        assert!(!daily);
    }
}
