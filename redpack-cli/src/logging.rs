//! Structured logging for the `redpack` binary.
//!
//! Two layers are installed on one `tracing` registry:
//! - a human-readable console layer on stderr, so it never mixes with the
//!   sample listings printed on stdout
//! - a JSON file layer on a rolling appender under the local data directory

use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Crates whose events are let through the filters.
const OWN_TARGETS: [&str; 2] = ["redpack", "redpack_core"];

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files are stored.
    pub log_directory: PathBuf,
    /// Log file name prefix ("redpack" -> "redpack.2026-01-15").
    pub log_file_prefix: String,
    /// Maximum level for our crates on the console.
    pub console_level: Level,
    /// Maximum level for our crates in the log file.
    pub file_level: Level,
    /// How often to start a new log file.
    pub rotation: LogRotation,
    /// Whether to colorize console output.
    pub console_ansi: bool,
    /// Whether to include file/line info on the console.
    pub include_file_line: bool,
    /// Whether to log span enter/exit (ingestion runs are spans).
    pub log_span_events: bool,
}

/// Log rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// New file every hour.
    Hourly,
    /// New file every day.
    Daily,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose configuration: debug on the console, trace in the file.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "redpack".to_string(),
            console_level: Level::DEBUG,
            file_level: Level::TRACE,
            rotation: LogRotation::Hourly,
            console_ansi: true,
            include_file_line: true,
            log_span_events: true,
        }
    }

    /// Quiet configuration: warnings on the console, debug in the file.
    ///
    /// The console stays at `warn` so skipped folders are still visible while
    /// listings stay readable.
    #[must_use]
    pub fn production() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "redpack".to_string(),
            console_level: Level::WARN,
            file_level: Level::DEBUG,
            rotation: LogRotation::Daily,
            console_ansi: true,
            include_file_line: false,
            log_span_events: false,
        }
    }

    /// Development config in debug builds or when `verbose`, production otherwise.
    #[must_use]
    pub fn auto(verbose: bool) -> Self {
        if verbose || cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: PathBuf) -> Self {
        self.log_directory = path;
        self
    }

    /// Filter directives: `base` for dependencies, `level` for our crates.
    fn directives(base: Level, level: Level) -> String {
        let mut directives = level_to_directive(base).to_string();
        for target in OWN_TARGETS {
            directives.push(',');
            directives.push_str(target);
            directives.push('=');
            directives.push_str(level_to_directive(level));
        }
        directives
    }

    fn console_filter(&self) -> Result<EnvFilter, LoggingError> {
        // RUST_LOG wins over the configured console level.
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        build_filter(&Self::directives(Level::WARN, self.console_level))
    }

    fn file_filter(&self) -> Result<EnvFilter, LoggingError> {
        build_filter(&Self::directives(Level::INFO, self.file_level))
    }
}

/// Guard that keeps file logging active. Drop it to flush the log file.
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until the program exits.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created, a filter
/// directive is invalid, or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    ensure_directory(&config.log_directory)?;

    let file_appender = RollingFileAppender::new(
        config.rotation.into(),
        &config.log_directory,
        &config.log_file_prefix,
    );
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let span_events = if config.log_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.console_ansi)
        .with_target(false)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(span_events.clone())
        .with_filter(config.console_filter()?);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .json()
        .with_filter(config.file_filter()?);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Default log directory under the platform's local data directory.
#[must_use]
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("redpack")
        .join("logs")
}

fn ensure_directory(path: &Path) -> Result<(), LoggingError> {
    if path.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| LoggingError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn build_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directives).map_err(|e| LoggingError::InvalidFilter {
        directives: directives.to_string(),
        reason: e.to_string(),
    })
}

const fn level_to_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create the log directory.
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryCreationFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for the failure.
        reason: String,
    },

    /// A filter directive did not parse.
    #[error("Invalid log filter {directives:?}: {reason}")]
    InvalidFilter {
        /// Directive string.
        directives: String,
        /// Parser message.
        reason: String,
    },

    /// Another subscriber was installed first.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
