//! Logging infrastructure for Archivum.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Environment variable names read by [`LogConfig::from_env`].
pub mod vars {
    pub const ARCHIVUM_LOG_LEVEL: &str = "ARCHIVUM_LOG_LEVEL";
    pub const ARCHIVUM_LOG_FORMAT: &str = "ARCHIVUM_LOG_FORMAT";
    pub const ARCHIVUM_LOG_FILE: &str = "ARCHIVUM_LOG_FILE";
    pub const ARCHIVUM_LOG_SOURCE: &str = "ARCHIVUM_LOG_SOURCE";
    pub const ARCHIVUM_LOG_SPANS: &str = "ARCHIVUM_LOG_SPANS";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include timestamps.
    pub timestamps: bool,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl LogFormat {
    /// Parse from string, falling back to [`LogFormat::Pretty`].
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            timestamps: true,
            source_location: false,
            span_events: false,
        }
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let level = std::env::var(vars::ARCHIVUM_LOG_LEVEL)
            .or_else(|_| std::env::var(vars::RUST_LOG))
            .ok()
            .and_then(|l| LogLevel::parse(&l));
        if let Some(level) = level {
            config.level = level;
        }

        if let Ok(format) = std::env::var(vars::ARCHIVUM_LOG_FORMAT) {
            config.format = LogFormat::parse(&format);
        }

        if let Ok(file_path) = std::env::var(vars::ARCHIVUM_LOG_FILE) {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Ok(source_location) = std::env::var(vars::ARCHIVUM_LOG_SOURCE) {
            config.source_location = flag(&source_location);
        }

        if let Ok(span_events) = std::env::var(vars::ARCHIVUM_LOG_SPANS) {
            config.span_events = flag(&span_events);
        }

        config
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Build one formatting layer writing to stderr, or to `file` when given.
    fn layer<S>(&self, file: Option<File>) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    {
        let ansi = file.is_none();
        let base = fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_file(self.source_location)
            .with_line_number(self.source_location)
            .with_span_events(self.span_events());

        let file = file.map(Mutex::new);
        match (self.format, file, self.timestamps) {
            (LogFormat::Pretty, None, true) => base.boxed(),
            (LogFormat::Pretty, None, false) => base.without_time().boxed(),
            (LogFormat::Pretty, Some(f), true) => base.with_writer(f).boxed(),
            (LogFormat::Pretty, Some(f), false) => base.with_writer(f).without_time().boxed(),
            (LogFormat::Compact, None, _) => base.compact().boxed(),
            (LogFormat::Compact, Some(f), _) => base.compact().with_writer(f).boxed(),
            (LogFormat::Json, None, _) => base.json().boxed(),
            (LogFormat::Json, Some(f), _) => base.json().with_writer(f).boxed(),
        }
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` style directives in the environment take precedence over
/// `config.level`. Output always goes to stderr and is additionally appended
/// to `config.file_path` when set.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));

    let file = match &config.file_path {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let mut layers = vec![config.layer(None)];
    if let Some(file) = file {
        layers.push(config.layer(Some(file)));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

/// Validation spans and timing.
pub mod spans;
