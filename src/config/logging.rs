//! Centralized logging configuration
//!
//! Structured logging using the `tracing` crate with:
//! - JSON formatted output for production (default)
//! - Pretty-print format for development (`LOG_FORMAT=pretty`)
//! - Level filtering via `RUST_LOG`
//! - Redaction helpers for API keys and signatures
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `exchange_rest=info` | Log level filter (standard tracing format) |
//! | `LOG_FORMAT` | `json` | Output format: `json` or `pretty` |

use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, prelude::*, EnvFilter};

/// Flag to track if logging has been initialized (prevents double-init)
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "exchange_rest=info";

/// Wrapper for sensitive data that should be redacted in logs.
///
/// Values longer than 8 characters keep their first 4 characters,
/// anything shorter is fully redacted.
#[derive(Clone)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }
}

impl<'a> fmt::Display for SanitizedValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.chars().count() > 8 {
            let prefix: String = self.0.chars().take(4).collect();
            write!(f, "{}...REDACTED", prefix)
        } else {
            write!(f, "REDACTED")
        }
    }
}

impl<'a> fmt::Debug for SanitizedValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanitizedValue(***)")
    }
}

/// Shorthand for `SanitizedValue::new(value)`.
pub fn sanitize(value: &str) -> SanitizedValue<'_> {
    SanitizedValue::new(value)
}

/// Sanitize a signature by showing only the first 8 characters.
pub fn sanitize_signature(sig: &str) -> String {
    if sig.chars().count() > 12 {
        let prefix: String = sig.chars().take(8).collect();
        format!("{}...", prefix)
    } else {
        "REDACTED".to_string()
    }
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter string (e.g., "exchange_rest=debug")
    pub level_filter: String,
    /// Use pretty format instead of JSON
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`.
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "pretty")
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Initialize logging from the environment. Subsequent calls are no-ops.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

/// Initialize logging with an explicit configuration.
pub fn init_logging_with_config(config: LoggingConfig) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if config.use_pretty_format {
        tracing_subscriber::registry()
            .with(ts_fmt::layer().pretty().with_target(true))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .with(env_filter)
            .init();
    }
}
