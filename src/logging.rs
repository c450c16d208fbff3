//! Log sinks and structured logging setup.
//!
//! The core forwards rendered chains to three independent sink
//! capabilities (warn, error, fatal); it does not format or filter by
//! level beyond choosing which sink to call. [`TracingSink`] is the
//! default backend, forwarding to `tracing`. The module also carries the
//! tracing-subscriber setup used by applications and tests.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Sink accepting warn-level messages.
pub trait WarnSink {
    /// Accepts one rendered message.
    fn warn(&self, message: &str);
}

/// Sink accepting error-level messages.
pub trait ErrorSink {
    /// Accepts one rendered message.
    fn error(&self, message: &str);
}

/// Sink accepting fatal-level messages.
pub trait FatalSink {
    /// Accepts one rendered message.
    fn fatal(&self, message: &str);
}

/// Default sink backed by `tracing`. Fatal messages are emitted at error
/// level with a `fatal` field, since `tracing` has no fatal level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarnSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

impl ErrorSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

impl FatalSink for TracingSink {
    fn fatal(&self, message: &str) {
        tracing::error!(fatal = true, "{message}");
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Most detailed debugging information.
    Trace,
    /// Detailed debugging information.
    Debug,
    /// Important events.
    Info,
    /// Potential issues.
    Warn,
    /// Error information.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable formatted output.
    Pretty,
    /// Compact format.
    Compact,
    /// JSON format for production environments.
    Json,
}

/// Log configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
    /// Whether to show thread IDs.
    pub show_thread_ids: bool,
    /// Whether to show the target module.
    pub show_target: bool,
    /// Whether to show span events (enter/exit).
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Configuration for development environments.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            show_span_events: true,
            ..Self::default()
        }
    }

    /// Configuration for production environments.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    /// Configuration for test environments.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_target: false,
            ..Self::default()
        }
    }
}

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("errlink={}", config.level)))
}

macro_rules! build_layer {
    ($config:expr, $style:ident) => {
        fmt::layer()
            .$style()
            .with_thread_ids($config.show_thread_ids)
            .with_target($config.show_target)
            .with_span_events(if $config.show_span_events {
                FmtSpan::ENTER | FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            })
            .with_filter(env_filter($config))
    };
}

/// Initializes the logging system. Panics when a subscriber is already
/// installed; use [`try_init_logging`] in tests.
pub fn init_logging(config: &LogConfig) {
    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_layer!(config, pretty))
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(build_layer!(config, compact))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_layer!(config, json))
            .init(),
    }
}

/// Attempts to initialize the logging system, ignoring duplicate
/// initialization. Suitable for tests.
pub fn try_init_logging(config: &LogConfig) {
    let result = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_layer!(config, pretty))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(build_layer!(config, compact))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_layer!(config, json))
            .try_init(),
    };
    let _ = result;
}
