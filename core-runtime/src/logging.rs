//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack for the core. Host
//! applications call [`init_logging`] once at startup; module-level
//! verbosity is controlled through the standard `RUST_LOG` syntax (e.g.
//! `core_playback=debug,core_sync=trace`) via the `filter` field.

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Compact;
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Custom filter string (e.g., "core_playback=debug,core_sync=trace").
    /// Falls back to `RUST_LOG`, then to `info`.
    pub filter: Option<String>,
    /// Display target module in logs
    pub display_target: bool,
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_display_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error when a global subscriber is already installed or the
/// filter string does not parse.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = match &config.filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| Error::Logging(format!("Invalid filter '{}': {}", directives, e)))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(config.display_target))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(config.display_target))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(config.display_target))
            .try_init(),
    };

    result.map_err(|e| Error::Logging(format!("Failed to install subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_string_is_rejected() {
        let config = LoggingConfig::default().with_filter("core_playback=notalevel=x=y");
        assert!(init_logging(config).is_err());
    }

    #[test]
    fn builder_collects_fields() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_filter("core_playback=debug")
            .with_display_target(true);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter.as_deref(), Some("core_playback=debug"));
        assert!(config.display_target);
    }
}
