//! Compiler configuration.
//!
//! Settings can come from code, a TOML document, or the environment:
//!
//! - `SIEVE_SOFT_DELETE=true|false` - Enable the soft-delete predicate
//! - `SIEVE_SOFT_DELETE_COLUMN=name` - Column holding the soft-delete marker
//! - `SIEVE_MAX_LIMIT=n` - Largest LIMIT a filter may request
//!
//! ```rust
//! use sieve_query::FilterConfig;
//!
//! let config = FilterConfig::from_toml_str(r#"
//!     soft_delete = true
//!     max_limit = 500
//! "#).unwrap();
//! assert!(config.soft_delete);
//! assert_eq!(config.soft_delete_column, "deleted");
//! assert_eq!(config.max_limit, Some(500));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FilterError, FilterResult};

/// Default soft-delete column.
pub const DEFAULT_SOFT_DELETE_COLUMN: &str = "deleted";

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Settings shared by every filter compiled for a given table or service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Add the soft-delete predicate unless a filter is unscoped.
    pub soft_delete: bool,
    /// Column holding the soft-delete marker.
    pub soft_delete_column: String,
    /// Largest LIMIT a filter may request.
    pub max_limit: Option<i64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            soft_delete: false,
            soft_delete_column: DEFAULT_SOFT_DELETE_COLUMN.to_string(),
            max_limit: None,
        }
    }
}

impl FilterConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable soft-delete filtering.
    pub fn with_soft_delete(mut self, enabled: bool) -> Self {
        self.soft_delete = enabled;
        self
    }

    /// Set the soft-delete column.
    pub fn with_soft_delete_column(mut self, column: impl Into<String>) -> Self {
        self.soft_delete_column = column.into();
        self
    }

    /// Set the largest LIMIT a filter may request.
    pub fn with_max_limit(mut self, max: i64) -> Self {
        self.max_limit = Some(max);
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> FilterResult<Self> {
        let config: Self = toml::from_str(input).map_err(|e| {
            FilterError::invalid_configuration("toml", e.message().to_string()).with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the process environment.
    pub fn from_env() -> FilterResult<Self> {
        Self::from_env_source(&StdEnvSource)
    }

    /// Load from a custom environment source. Unset variables keep their defaults.
    pub fn from_env_source(source: &dyn EnvSource) -> FilterResult<Self> {
        let mut config = Self::default();

        if let Some(value) = source.get("SIEVE_SOFT_DELETE") {
            config.soft_delete = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" | "" => false,
                other => {
                    return Err(FilterError::invalid_configuration(
                        "SIEVE_SOFT_DELETE",
                        format!("expected a boolean, found '{}'", other),
                    ));
                }
            };
        }

        if let Some(value) = source.get("SIEVE_SOFT_DELETE_COLUMN") {
            config.soft_delete_column = value.trim().to_string();
        }

        if let Some(value) = source.get("SIEVE_MAX_LIMIT") {
            let value = value.trim();
            if !value.is_empty() {
                let max = value.parse::<i64>().map_err(|e| {
                    FilterError::invalid_configuration(
                        "SIEVE_MAX_LIMIT",
                        format!("expected an integer, found '{}'", value),
                    )
                    .with_source(e)
                })?;
                config.max_limit = Some(max);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the compiler cannot use.
    pub fn validate(&self) -> FilterResult<()> {
        check_soft_delete_column(&self.soft_delete_column)?;
        check_max_limit(self.max_limit)
    }
}

/// The soft-delete column is rendered verbatim, so it must be a plain identifier.
pub(crate) fn check_soft_delete_column(column: &str) -> FilterResult<()> {
    let is_identifier = !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !is_identifier {
        return Err(FilterError::invalid_configuration(
            "soft_delete_column",
            format!("'{}' is not a plain column name", column),
        ));
    }
    Ok(())
}

pub(crate) fn check_max_limit(max_limit: Option<i64>) -> FilterResult<()> {
    if let Some(max) = max_limit {
        if max < 0 {
            return Err(FilterError::invalid_configuration(
                "max_limit",
                "must not be negative",
            ));
        }
    }
    Ok(())
}
