//! JSON filter-expression parser.
//!
//! Grammar:
//!
//! ```text
//! filter         := { "$or": [ condition, ... ] } | condition
//! condition      := { field: scalar | operatorObject, ... }
//! operatorObject := { "$op": operand, ... }
//! ```
//!
//! A field mapped to a scalar is shorthand for `$eq`. Lists only bind through
//! `$in` / `$nin`; a bare list under a field is rejected.
//!
//! Clauses the parser cannot represent are dropped rather than failing the
//! whole payload: an operand of the wrong shape drops its clause with
//! [`ErrorCode::UnsupportedOperand`](crate::ErrorCode::UnsupportedOperand),
//! an unknown operator drops its clause with
//! [`ErrorCode::UnknownOperator`](crate::ErrorCode::UnknownOperator). Invalid
//! JSON and a broken top level are hard errors.
//!
//! ```rust
//! use sieve_query::parse_where;
//!
//! let w = parse_where(br#"{"$or": [{"age": {"$gte": 18}}, {"age": {"$lt": 5}}]}"#).unwrap();
//! assert_eq!(w.len(), 2);
//! ```

use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{FilterError, FilterResult};
use crate::expr::{Condition, Expression, ExpressionList};
use crate::operator::Operator;
use crate::value::FilterValue;
use crate::where_clause::Where;

/// Top-level key introducing a disjunction of conditions.
pub const OR_KEY: &str = "$or";

/// A parsed where clause together with the clauses dropped along the way.
#[derive(Debug, Default)]
pub struct ParsedWhere {
    /// The parsed where clause.
    pub where_clause: Where,
    /// Non-fatal errors for every dropped field or operator clause.
    pub dropped: Vec<FilterError>,
}

/// Parse a JSON filter payload into a [`Where`].
///
/// Empty or whitespace-only input yields an empty where clause.
pub fn parse_where(raw: &[u8]) -> FilterResult<Where> {
    parse_where_with_diagnostics(raw).map(|parsed| parsed.where_clause)
}

/// Parse a JSON filter payload, reporting dropped clauses.
pub fn parse_where_with_diagnostics(raw: &[u8]) -> FilterResult<ParsedWhere> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(ParsedWhere::default());
    }

    let root: Value = serde_json::from_slice(raw).map_err(FilterError::invalid_json)?;
    let root = match root {
        Value::Object(map) => map,
        other => {
            return Err(
                FilterError::malformed(format!("expected an object, found {}", json_kind(&other)))
                    .with_input(other.to_string()),
            );
        }
    };

    let mut parser = Parser::default();
    let mut where_clause = Where::new();

    match root.get(OR_KEY) {
        Some(any) => {
            if root.len() > 1 {
                return Err(FilterError::malformed(
                    "$or cannot be combined with other top-level fields",
                ));
            }
            let groups = any.as_array().ok_or_else(|| {
                FilterError::malformed(format!("$or expects a list, found {}", json_kind(any)))
                    .with_input(any.to_string())
            })?;
            for group in groups {
                let group = group.as_object().ok_or_else(|| {
                    FilterError::malformed(format!(
                        "$or entries must be objects, found {}",
                        json_kind(group)
                    ))
                    .with_input(group.to_string())
                })?;
                where_clause.push(parser.condition(group)?);
            }
        }
        None => where_clause.push(parser.condition(&root)?),
    }

    debug!(
        groups = where_clause.len(),
        dropped = parser.dropped.len(),
        "parsed filter expression"
    );

    Ok(ParsedWhere {
        where_clause,
        dropped: parser.dropped,
    })
}

impl FromStr for Where {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_where(s.as_bytes())
    }
}

#[derive(Default)]
struct Parser {
    dropped: Vec<FilterError>,
}

impl Parser {
    fn condition(&mut self, object: &Map<String, Value>) -> FilterResult<Condition> {
        let mut condition = Condition::new();
        for (field, value) in object {
            let exprs = self.field_clause(field, value)?;
            condition.insert(field.as_str(), exprs);
        }
        Ok(condition)
    }

    fn field_clause(&mut self, field: &str, value: &Value) -> FilterResult<ExpressionList> {
        let mut exprs = ExpressionList::new();

        match value {
            Value::Object(ops) => {
                for (token, operand) in ops {
                    let Some(op) = Operator::from_token(token) else {
                        self.drop_clause(FilterError::unknown_operator(field, token.as_str()));
                        continue;
                    };
                    let parsed = operand_value(operand)
                        .map_err(|found| FilterError::unsupported_operand(field, found))
                        .and_then(|value| Expression::new(op, value))
                        .map_err(|err| {
                            err.with_field(field)
                                .with_operator(token.as_str())
                                .with_input(operand.to_string())
                        });
                    match parsed {
                        Ok(expr) => exprs.push(expr),
                        Err(err) => self.drop_clause(err),
                    }
                }
            }
            Value::Array(_) => {
                return Err(FilterError::malformed(format!(
                    "bare list under {}; use $in or $nin",
                    field
                ))
                .with_field(field)
                .with_input(value.to_string()));
            }
            scalar => {
                let parsed = operand_value(scalar)
                    .map_err(|found| FilterError::unsupported_operand(field, found))
                    .and_then(Expression::eq)
                    .map_err(|err| err.with_field(field).with_input(scalar.to_string()));
                match parsed {
                    Ok(expr) => exprs.push(expr),
                    Err(err) => self.drop_clause(err),
                }
            }
        }

        Ok(exprs)
    }

    fn drop_clause(&mut self, err: FilterError) {
        warn!(
            code = %err.code,
            field = err.context.field.as_deref().unwrap_or_default(),
            operator = err.context.operator.as_deref().unwrap_or_default(),
            "dropping filter clause: {}",
            err.message
        );
        self.dropped.push(err);
    }
}

/// Convert a JSON operand, or describe why it cannot be represented.
fn operand_value(value: &Value) -> Result<FilterValue, &'static str> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) => Err("nested list"),
                other => scalar_value(other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FilterValue::List),
        other => scalar_value(other),
    }
}

fn scalar_value(value: &Value) -> Result<FilterValue, &'static str> {
    match value {
        Value::Bool(b) => Ok(FilterValue::Bool(*b)),
        Value::String(s) => Ok(FilterValue::String(s.clone())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(FilterValue::Int(i)),
            None if n.is_u64() => Err("integer out of range"),
            None => Err("fractional number"),
        },
        Value::Null => Err("null"),
        Value::Object(_) => Err("object"),
        Value::Array(_) => Err("list"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn parse(raw: &str) -> ParsedWhere {
        parse_where_with_diagnostics(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_scalar_shorthand_is_eq() {
        let w = parse(r#"{"status": "active", "vip": true, "age": 30}"#).where_clause;
        assert_eq!(w.len(), 1);

        let cond = w.iter().next().unwrap();
        let fields: Vec<_> = cond.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["status", "vip", "age"]);
        assert_eq!(cond.get("age").unwrap()[0].op(), Operator::Eq);
        assert_eq!(cond.get("age").unwrap()[0].value(), &FilterValue::Int(30));
    }

    #[test]
    fn test_operator_object() {
        let w = parse(r#"{"age": {"$gte": 18, "$lt": 65}, "id": {"$in": [1, 2, 3]}}"#).where_clause;
        let cond = w.iter().next().unwrap();

        let age = cond.get("age").unwrap();
        assert_eq!(age.len(), 2);
        assert_eq!(age[0].op(), Operator::Gte);
        assert_eq!(age[1].op(), Operator::Lt);

        let id = cond.get("id").unwrap();
        assert_eq!(id[0].value(), &FilterValue::from(vec![1, 2, 3]));
    }

    #[test]
    fn test_or_produces_one_group_per_entry() {
        let w = parse(r#"{"$or": [{"a": 1}, {"b": 2}, {"c": 3}]}"#).where_clause;
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").where_clause.is_empty());
        assert!(parse("  \n").where_clause.is_empty());
        assert!(parse("{}").where_clause.is_empty());
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = parse_where(b"{\"a\": ").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        let err = parse_where(b"[1, 2]").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);
    }

    #[test]
    fn test_or_entry_must_be_object() {
        let err = parse_where(br#"{"$or": [{"a": 1}, 2]}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        let err = parse_where(br#"{"$or": {"a": 1}}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);

        let err = parse_where(br#"{"$or": [{"a": 1}], "b": 2}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);
    }

    #[test]
    fn test_bare_list_is_rejected() {
        let err = parse_where(br#"{"id": [1, 2]}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);
        assert_eq!(err.context.field.as_deref(), Some("id"));
    }

    #[test]
    fn test_unsupported_operands_are_dropped() {
        let parsed = parse(r#"{"meta": {"$eq": {"x": 1}}, "score": 1.5, "gone": null, "name": "bo"}"#);
        let cond = parsed.where_clause.iter().next().unwrap();

        assert_eq!(cond.len(), 1);
        assert!(cond.get("name").is_some());
        assert_eq!(parsed.dropped.len(), 3);
        assert!(parsed.dropped.iter().all(|e| e.code == ErrorCode::UnsupportedOperand));
    }

    #[test]
    fn test_unknown_operator_is_dropped() {
        let parsed = parse(r#"{"age": {"$between": [1, 2], "$gt": 1}}"#);
        let cond = parsed.where_clause.iter().next().unwrap();

        assert_eq!(cond.get("age").unwrap().len(), 1);
        assert_eq!(parsed.dropped.len(), 1);
        assert_eq!(parsed.dropped[0].code, ErrorCode::UnknownOperator);
        assert_eq!(parsed.dropped[0].context.operator.as_deref(), Some("$between"));
    }

    #[test]
    fn test_operand_shape_mismatch_is_dropped() {
        let parsed = parse(r#"{"id": {"$in": 3}, "name": {"$like": 4}, "tag": {"$in": [[1]]}}"#);
        assert!(parsed.where_clause.is_empty());
        assert_eq!(parsed.dropped.len(), 3);
    }

    #[test]
    fn test_empty_membership_list_parses() {
        let w = parse(r#"{"id": {"$in": []}}"#).where_clause;
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_from_str() {
        let w: Where = r#"{"a": 1}"#.parse().unwrap();
        assert_eq!(w.to_string(), "[{a:[{$eq:1}]}]");
    }
}
