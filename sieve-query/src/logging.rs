//! Logging setup for sieve.
//!
//! The library itself only emits `tracing` events; parse warnings for
//! dropped clauses are logged at `warn`, compile summaries at `debug`, and
//! generated SQL at `trace` when `SIEVE_DEBUG` is on.
//!
//! # Environment Variables
//!
//! - `SIEVE_DEBUG=true|1|yes` - Enable debug logging
//! - `SIEVE_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `SIEVE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! Installing a subscriber needs the `tracing-subscriber` feature. Without
//! it, [`init`] is a no-op and events go to whatever subscriber the
//! application installs.
//!
//! ```rust,no_run
//! use sieve_query::logging;
//!
//! // Call once at startup.
//! logging::init();
//! ```

use std::sync::Once;

use crate::config::{EnvSource, StdEnvSource};

static INIT: Once = Once::new();

/// Output format for the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

impl LogFormat {
    /// Lowercase name, as accepted by `SIEVE_LOG_FORMAT`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

/// Logging settings read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Whether `SIEVE_DEBUG` is on.
    pub debug: bool,
    /// Explicit level from `SIEVE_LOG_LEVEL`, if valid.
    pub level: Option<&'static str>,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Read settings from an environment source.
    pub fn from_env_source(source: &dyn EnvSource) -> Self {
        let debug = debug_flag(source);

        let level = source
            .get("SIEVE_LOG_LEVEL")
            .and_then(|level| match level.trim().to_lowercase().as_str() {
                "trace" => Some("trace"),
                "debug" => Some("debug"),
                "info" => Some("info"),
                "warn" => Some("warn"),
                "error" => Some("error"),
                _ => None,
            });

        let format = source
            .get("SIEVE_LOG_FORMAT")
            .map(|f| match f.trim().to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Json,
            })
            .unwrap_or_default();

        Self {
            debug,
            level,
            format,
        }
    }

    /// Effective level: the explicit level, else `debug` with `SIEVE_DEBUG`, else `warn`.
    pub fn effective_level(&self) -> &'static str {
        match (self.level, self.debug) {
            (Some(level), _) => level,
            (None, true) => "debug",
            (None, false) => "warn",
        }
    }

    /// Whether a subscriber should be installed at all.
    pub fn is_requested(&self) -> bool {
        self.debug || self.level.is_some()
    }
}

fn debug_flag(source: &dyn EnvSource) -> bool {
    source
        .get("SIEVE_DEBUG")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Check if `SIEVE_DEBUG` is enabled.
///
/// Only `SIEVE_DEBUG` is read, so this stays cheap on hot paths.
#[inline]
pub fn is_debug_enabled() -> bool {
    debug_flag(&StdEnvSource)
}

/// The configured log level.
pub fn get_log_level() -> &'static str {
    LogSettings::from_env_source(&StdEnvSource).effective_level()
}

/// The configured log format name.
pub fn get_log_format() -> &'static str {
    LogSettings::from_env_source(&StdEnvSource).format.as_str()
}

/// Initialize logging from the process environment.
///
/// Subsequent calls are no-ops. Nothing is installed unless `SIEVE_DEBUG`
/// or `SIEVE_LOG_LEVEL` is set.
pub fn init() {
    init_with_settings(LogSettings::from_env_source(&StdEnvSource));
}

/// Initialize logging at a specific level, ignoring `SIEVE_LOG_LEVEL`.
pub fn init_with_level(level: &'static str) {
    let mut settings = LogSettings::from_env_source(&StdEnvSource);
    settings.level = Some(level);
    init_with_settings(settings);
}

/// Initialize debug-level logging.
pub fn init_debug() {
    let mut settings = LogSettings::from_env_source(&StdEnvSource);
    settings.debug = true;
    init_with_settings(settings);
}

/// Initialize logging with explicit settings.
pub fn init_with_settings(settings: LogSettings) {
    INIT.call_once(|| {
        if !settings.is_requested() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = settings.effective_level();
            let filter = EnvFilter::try_new(format!("sieve={},sieve_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match settings.format {
                LogFormat::Json => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                LogFormat::Compact => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                LogFormat::Pretty => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = settings.format.as_str(), "sieve logging initialized");
            }
        }
    });
}

/// Debug-level event emitted only when `SIEVE_DEBUG` is enabled.
#[macro_export]
macro_rules! sieve_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Trace-level event emitted only when `SIEVE_DEBUG` is enabled.
#[macro_export]
macro_rules! sieve_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::trace!($($arg)*);
        }
    };
}
