//! Integration tests for building filters from query strings and config.

use pretty_assertions::assert_eq;

use sieve::{ErrorCode, Filter, FilterConfig, FilterParams, FilterValue, MapEnvSource};

fn encode(json: &str) -> String {
    json.bytes()
        .map(|b| match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[test]
fn test_full_query_string() {
    let query = format!(
        "where={}&order=-created,name&limit=10&skip=30",
        encode(r#"{"$or": [{"status": "active"}, {"role": {"$in": ["admin", "owner"]}}]}"#)
    );
    let filter = Filter::from_query(&query, &FilterConfig::default()).unwrap();

    let (sql, params) = filter.to_sql().unwrap();
    assert_eq!(
        sql,
        "WHERE ((status=?) OR (role IN (?, ?))) ORDER BY created DESC, name LIMIT 10 OFFSET 30"
    );
    assert_eq!(
        params,
        vec![
            FilterValue::from("active"),
            FilterValue::from("admin"),
            FilterValue::from("owner"),
        ]
    );
}

#[test]
fn test_env_config_drives_soft_delete() {
    let env = MapEnvSource::new()
        .set("SIEVE_SOFT_DELETE", "true")
        .set("SIEVE_SOFT_DELETE_COLUMN", "removed")
        .set("SIEVE_MAX_LIMIT", "100");
    let config = FilterConfig::from_env_source(&env).unwrap();

    let filter = Filter::from_query(&format!("where={}", encode(r#"{"a": 1}"#)), &config).unwrap();
    assert_eq!(filter.to_sql().unwrap().0, "WHERE (removed = 0) AND (a=?)");

    let filter = Filter::from_query("limit=500", &config).unwrap();
    assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::InvalidPagination);
}

#[test]
fn test_toml_config() {
    let config = FilterConfig::from_toml_str(
        r#"
        soft_delete = true
        soft_delete_column = "archived"
        "#,
    )
    .unwrap();

    let filter = Filter::from_query("order=-id", &config).unwrap();
    assert_eq!(filter.to_sql().unwrap().0, "WHERE (archived = 0) ORDER BY id DESC");
}

#[test]
fn test_malformed_where_parameter() {
    let err = Filter::from_query("where=%7Bnot-json", &FilterConfig::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::MalformedInput);
}

#[test]
fn test_params_from_serde() {
    let params: FilterParams = serde_json::from_value(serde_json::json!({
        "order": "name",
        "offset": "5",
    }))
    .unwrap();

    let filter = params.into_filter(&FilterConfig::default()).unwrap();
    assert_eq!(filter.to_sql().unwrap().0, "ORDER BY name");
}

#[test]
fn test_skip_needs_a_limit() {
    let config = FilterConfig::default();

    let filter = Filter::from_query("order=name&skip=20", &config).unwrap();
    let (sql, _) = filter.to_sql().unwrap();
    assert!(!sql.contains("OFFSET"));

    let filter = Filter::from_query("order=name&limit=10&skip=20", &config).unwrap();
    assert_eq!(filter.to_sql().unwrap().0, "ORDER BY name LIMIT 10 OFFSET 20");
}
