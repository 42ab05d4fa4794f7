//! Rulechain Logging
//!
//! The engine crates log through `tracing`. This crate turns the
//! `RULECHAIN_*` environment variables into a ready-made subscriber.
//!
//! # Usage
//!
//! ```rust
//! // Install once at startup; later calls are no-ops.
//! rulechain_log::init();
//!
//! tracing::debug!(field = "zip", "re-validating");
//! ```
//!
//! # Environment Variables
//!
//! - `RULECHAIN_DEBUG=1` - Enable debug logging
//! - `RULECHAIN_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `RULECHAIN_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `RULECHAIN_LOG_COLOR=1|0` - Enable/disable colors
//! - `RULECHAIN_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `RULECHAIN_LOG_MODULE=1|0` - Include the module path of each event
//!
//! `RUST_LOG`, when set, takes precedence over the level.

use once_cell::sync::Lazy;
use std::env;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for rulechain logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Trace level (most verbose); shows every chain evaluation
    Trace,
    Debug,
    Info,
    Warn,
    /// Error level (least verbose)
    Error,
    /// Off (no logging)
    Off,
}

impl Level {
    /// Get level from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Get level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    /// Directive understood by [`EnvFilter`]
    pub fn as_filter(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line, human-oriented format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Get format from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pretty => "pretty",
            Format::Compact => "compact",
            Format::Json => "json",
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Global configuration (lazy initialized).
static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include module path
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Compact,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

fn flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from any key lookup, using the same variable names as
    /// [`LogConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = lookup("RULECHAIN_DEBUG").is_some_and(|v| flag(&v));

        let level = lookup("RULECHAIN_LOG_LEVEL")
            .and_then(|s| Level::from_str(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("RULECHAIN_LOG_FORMAT")
            .and_then(|s| Format::from_str(&s))
            .unwrap_or(Format::Compact);

        // Color by default on a terminal, unless NO_COLOR is set
        let color = lookup("RULECHAIN_LOG_COLOR")
            .map(|v| flag(&v))
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        let timestamps = lookup("RULECHAIN_LOG_TIMESTAMPS").is_none_or(|v| flag(&v));
        let module_path = lookup("RULECHAIN_LOG_MODULE").is_none_or(|v| flag(&v));

        Self {
            debug,
            level,
            format,
            color: color && format != Format::Json,
            timestamps,
            module_path,
        }
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::new(self.level.as_filter())
    }
}

/// Get the global configuration.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Check if debug logging is enabled.
pub fn is_debug_enabled() -> bool {
    config().debug || config().level <= Level::Debug
}

// ============================================================================
// Subscriber
// ============================================================================

fn fmt_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let layer = fmt::layer()
        .with_ansi(config.color)
        .with_target(config.module_path);

    match (config.format, config.timestamps) {
        (Format::Pretty, true) => layer.pretty().boxed(),
        (Format::Pretty, false) => layer.pretty().without_time().boxed(),
        (Format::Compact, true) => layer.compact().boxed(),
        (Format::Compact, false) => layer.compact().without_time().boxed(),
        (Format::Json, true) => layer.json().boxed(),
        (Format::Json, false) => layer.json().without_time().boxed(),
    }
}

/// Build a subscriber for `config`.
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn subscriber_for(config: &LogConfig) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.filter());

    tracing_subscriber::registry()
        .with(fmt_layer::<Registry>(config))
        .with(filter)
}

/// Create a tracing subscriber from the global configuration.
pub fn subscriber() -> impl tracing::Subscriber + Send + Sync + 'static {
    subscriber_for(config())
}

/// Install the global subscriber.
///
/// Returns `false` when a global subscriber was already set, by this or any
/// other crate.
pub fn init() -> bool {
    subscriber().try_init().is_ok()
}

// ============================================================================
// Tests
// ============================================================================
