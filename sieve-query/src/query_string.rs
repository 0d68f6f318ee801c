//! Filters from HTTP query strings.
//!
//! Recognized parameters:
//!
//! - `where` - a JSON filter expression
//! - `order` - comma-separated sort tokens, `-` prefix for descending
//! - `limit` - a non-negative integer
//! - `skip` / `offset` - a non-negative integer (`skip` wins when both are set)
//!
//! Unknown parameters are ignored, and empty values count as unset. A skip
//! only applies alongside a positive `limit`; without one it is dropped, as
//! most dialects reject a bare `OFFSET`.
//!
//! ```rust
//! use sieve_query::{Filter, FilterConfig};
//!
//! let query = "where=%7B%22status%22%3A%22active%22%7D&order=-created&limit=10&skip=20";
//! let filter = Filter::from_query(query, &FilterConfig::default()).unwrap();
//! let (sql, _) = filter.to_sql().unwrap();
//! assert_eq!(sql, "WHERE (status=?) ORDER BY created DESC LIMIT 10 OFFSET 20");
//! ```

use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::error::{FilterError, FilterResult};
use crate::filter::Filter;
use crate::parser::parse_where;

/// Raw filter parameters as they arrive from a request.
///
/// Derives `Deserialize` so web extractors can fill it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// JSON filter expression.
    #[serde(rename = "where")]
    pub where_: Option<String>,
    /// Comma-separated sort tokens.
    pub order: Option<String>,
    /// Row limit.
    pub limit: Option<String>,
    /// Rows to skip.
    pub skip: Option<String>,
    /// Alias for `skip`.
    pub offset: Option<String>,
}

impl FilterParams {
    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. When a parameter repeats, the last value wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "where" => &mut params.where_,
                "order" => &mut params.order,
                "limit" => &mut params.limit,
                "skip" => &mut params.skip,
                "offset" => &mut params.offset,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        params
    }

    /// Build a filter using the given settings.
    ///
    /// The settings are validated first, so a config assembled in code gets
    /// the same checks as one loaded from TOML or the environment.
    pub fn into_filter(self, config: &FilterConfig) -> FilterResult<Filter> {
        config.validate()?;
        let mut filter = Filter::with_config(config);

        if let Some(raw) = non_empty(&self.where_) {
            filter.set_where(parse_where(raw.as_bytes())?);
        }

        if let Some(order) = non_empty(&self.order) {
            for token in order.split(',') {
                filter.order(token);
            }
        }

        let limit = match non_empty(&self.limit) {
            Some(limit) => parse_count("limit", limit)?,
            None => 0,
        };
        filter.limit(limit);

        let offset = match (non_empty(&self.skip), non_empty(&self.offset)) {
            (Some(skip), _) => Some(parse_count("skip", skip)?),
            (None, Some(offset)) => Some(parse_count("offset", offset)?),
            (None, None) => None,
        };
        match offset {
            Some(offset) if limit > 0 => {
                filter.offset(offset);
            }
            Some(offset) => {
                crate::sieve_debug!(offset, "ignoring skip without a limit");
            }
            None => {}
        }

        Ok(filter)
    }
}

impl Filter {
    /// Build a filter from a URL query string.
    pub fn from_query(query: &str, config: &FilterConfig) -> FilterResult<Self> {
        FilterParams::from_query(query).into_filter(config)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_count(name: &str, raw: &str) -> FilterResult<i64> {
    let n = raw.parse::<i64>().map_err(|e| {
        FilterError::invalid_pagination(name, format!("expected an integer, found '{}'", raw))
            .with_input(raw)
            .with_source(e)
    })?;
    if n < 0 {
        return Err(
            FilterError::invalid_pagination(name, format!("must not be negative, found {}", n))
                .with_input(raw),
        );
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_query_decodes_values() {
        let params = FilterParams::from_query("?where=%7B%22a%22%3A1%7D&order=name,-id&limit=5&foo=bar");
        assert_eq!(params.where_.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(params.order.as_deref(), Some("name,-id"));
        assert_eq!(params.limit.as_deref(), Some("5"));
        assert_eq!(params.skip, None);
    }

    #[test]
    fn test_skip_wins_over_offset() {
        let filter =
            Filter::from_query("limit=10&offset=3&skip=7", &FilterConfig::default()).unwrap();
        assert_eq!(filter.offset_value(), 7);

        let filter = Filter::from_query("limit=10&offset=3", &FilterConfig::default()).unwrap();
        assert_eq!(filter.offset_value(), 3);
    }

    #[test]
    fn test_skip_without_limit_is_dropped() {
        let filter = Filter::from_query("order=name&skip=20", &FilterConfig::default()).unwrap();
        assert_eq!(filter.offset_value(), 0);
        assert_eq!(filter.to_sql().unwrap().0, "ORDER BY name");

        let filter = Filter::from_query("limit=0&offset=5", &FilterConfig::default()).unwrap();
        assert_eq!(filter.to_sql().unwrap().0, "");
    }

    #[test]
    fn test_skip_is_still_validated_without_limit() {
        let err = Filter::from_query("skip=abc", &FilterConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPagination);
    }

    #[test]
    fn test_config_is_validated() {
        let config = FilterConfig::new()
            .with_soft_delete(true)
            .with_soft_delete_column("1) OR (1");
        let err = Filter::from_query("limit=5", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);

        let config = FilterConfig::new().with_max_limit(-1);
        let err = Filter::from_query("limit=5", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let filter = Filter::from_query("where=&limit=&order=", &FilterConfig::default()).unwrap();
        assert_eq!(filter.to_sql().unwrap().0, "");
    }

    #[test]
    fn test_bad_pagination() {
        let err = Filter::from_query("limit=ten", &FilterConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPagination);

        let err = Filter::from_query("skip=-1", &FilterConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPagination);
    }

    #[test]
    fn test_config_applies() {
        let config = FilterConfig::new().with_soft_delete(true);
        let filter = Filter::from_query("limit=2", &config).unwrap();
        assert_eq!(filter.to_sql().unwrap().0, "WHERE (deleted = 0) LIMIT 2");
    }

    #[test]
    fn test_deserialize_from_json() {
        let params: FilterParams =
            serde_json::from_str(r#"{"where": "{\"a\": 1}", "limit": "4"}"#).unwrap();
        let (sql, _) = params.into_filter(&FilterConfig::default()).unwrap().to_sql().unwrap();
        assert_eq!(sql, "WHERE (a=?) LIMIT 4");
    }
}
