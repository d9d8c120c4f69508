//! Structured logging infrastructure for courserank.
//!
//! This module provides a configurable logging system based on the tracing crate,
//! supporting different output formats and log levels.

#[cfg(test)]
mod tests;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Initialize the logging system with the given configuration.
///
/// When logging to a file the returned guard must be kept alive for as long
/// as log lines should be flushed. Initializing twice is not an error; the
/// first subscriber stays installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level = log_level_to_level(config.level);

    let result = match (&config.file, config.stdout) {
        (Some(file_path), false) => {
            let (writer, guard) = create_non_blocking_file(file_path)?;
            install(level, config.format, writer).map(|_| Some(guard))
        }
        (Some(_), true) => install(level, config.format, std::io::stdout).map(|_| {
            tracing::warn!("Configured for stdout only; file logging ignored");
            None
        }),
        (None, true) => install(level, config.format, std::io::stdout).map(|_| None),
        (None, false) => Ok(None),
    };

    // If the error is "already set", ignore it
    if let Err(LogError::SubscriberError(ref e)) = result
        && (e.to_string().contains("SetGlobalDefaultError")
            || e.to_string().contains("already been set"))
    {
        return Ok(None);
    }

    result
}

fn install<W>(level: Level, format: LogFormat, writer: W) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, directives.as_deref()))
        .with_level(true)
        .with_target(true)
        .with_line_number(true)
        .with_writer(writer);

    match format {
        LogFormat::Json => builder.json().try_init()?,
        LogFormat::Compact => builder.compact().try_init()?,
        LogFormat::Pretty => builder.pretty().try_init()?,
        LogFormat::Default => builder.try_init()?,
    }

    Ok(())
}

/// `RUST_LOG`-style directives when present and valid, else the configured level.
pub(crate) fn env_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| {
            EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
        })
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        path.file_name().unwrap_or_default(),
    );

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Convert a LogLevel into the tracing::Level it filters at.
pub fn log_level_to_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
        }
    }
}

impl std::error::Error for LogError {}
