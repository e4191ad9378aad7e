//! Tracing setup for binaries and tests.
//!
//! The library itself only emits `tracing` events; call [`init`] (or
//! [`init_from_config`]) once from a binary to see them. `RUST_LOG`
//! overrides the configured level.
//!
//! # Example
//! ```no_run
//! use daq_driver_ad5706r::logging::{self, LoggingConfig, OutputFormat};
//! use tracing::Level;
//!
//! logging::init(LoggingConfig::new(Level::DEBUG).with_format(OutputFormat::Compact))?;
//! # Ok::<(), daq_driver_ad5706r::Ad5706rError>(())
//! ```

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::DriverConfig;
use crate::error::{Ad5706rError, Result};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Multi-line, colored (development)
    Pretty,
    /// Single-line, no colors
    Compact,
    /// JSON objects (log aggregation)
    Json,
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: Level,
    /// Output format
    pub format: OutputFormat,
    /// Include source file and line
    pub with_file_and_line: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: OutputFormat::Compact,
            with_file_and_line: false,
        }
    }
}

impl LoggingConfig {
    /// Logging config with the given level and default format.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Include source file and line numbers.
    pub fn with_file_and_line(mut self, enabled: bool) -> Self {
        self.with_file_and_line = enabled;
        self
    }
}

/// Parse a log level name (case-insensitive).
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Ad5706rError::InvalidConfig {
            message: format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                level
            ),
        }),
    }
}

/// Initialize logging from the driver configuration.
pub fn init_from_config(config: &DriverConfig) -> Result<()> {
    init(LoggingConfig::new(parse_log_level(&config.log_level)?))
}

/// Build the subscriber described by `config` without installing it.
pub fn subscriber(config: &LoggingConfig) -> impl tracing::Subscriber + Send + Sync + 'static {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_lowercase()));

    let layer = fmt::layer()
        .with_file(config.with_file_and_line)
        .with_line_number(config.with_file_and_line);

    let layer = match config.format {
        OutputFormat::Pretty => layer.pretty().with_filter(env_filter).boxed(),
        OutputFormat::Compact => layer
            .compact()
            .with_ansi(false)
            .with_filter(env_filter)
            .boxed(),
        OutputFormat::Json => layer.json().with_filter(env_filter).boxed(),
    };

    tracing_subscriber::registry().with(layer)
}

/// Install the global subscriber.
///
/// Calling this again after a subscriber is installed is a no-op.
pub fn init(config: LoggingConfig) -> Result<()> {
    subscriber(&config).try_init().or_else(|e| {
        if e.to_string()
            .contains("a global default trace dispatcher has already been set")
        {
            Ok(())
        } else {
            Err(Ad5706rError::InvalidConfig {
                message: format!("Failed to initialize tracing: {}", e),
            })
        }
    })
}
