//! SQL rendering for [`Filter`].
//!
//! The output grammar is
//!
//! ```text
//! [WHERE <expr>] [ORDER BY <field>[ DESC][, ...]] [LIMIT <n>] [OFFSET <n>]
//! ```
//!
//! with `?` as the only placeholder. The Nth `?` in the text binds the Nth
//! returned parameter. WHERE parts are ANDed in this order:
//!
//! 1. the soft-delete predicate, `(deleted = 0)`
//! 2. raw conditions added with [`Filter::add_condition`]
//! 3. the parsed [`Where`] groups
//! 4. conditions added through the fluent builder
//!
//! ORDER BY, LIMIT and OFFSET never bind parameters.

use tracing::debug;

use crate::config::{check_max_limit, check_soft_delete_column};
use crate::error::{FilterError, FilterResult};
use crate::expr::{Condition, Expression};
use crate::filter::{Clause, Filter};
use crate::operator::Operator;
use crate::value::FilterValue;
use crate::where_clause::Where;

impl Filter {
    /// Compile the whole filter into SQL text and positional parameters.
    ///
    /// An empty filter compiles to an empty string. Each call starts from a
    /// fresh parameter list, so compiling twice yields identical output.
    ///
    /// ```rust
    /// use sieve_query::{parse_where, Filter, FilterValue};
    ///
    /// let w = parse_where(br#"{"status": "active"}"#).unwrap();
    /// let (sql, params) = Filter::from_where(w).to_sql().unwrap();
    /// assert_eq!(sql, "WHERE (status=?)");
    /// assert_eq!(params, vec![FilterValue::from("active")]);
    /// ```
    pub fn to_sql(&self) -> FilterResult<(String, Vec<FilterValue>)> {
        self.check_pagination()?;

        let (where_sql, params) = self.where_sql()?;
        let mut sections = Vec::with_capacity(4);
        if !where_sql.is_empty() {
            sections.push(where_sql);
        }
        if !self.order_by.is_empty() {
            let mut order = String::from("ORDER BY ");
            self.order_by.write_sql(&mut order);
            sections.push(order);
        }
        if self.limit > 0 {
            sections.push(format!("LIMIT {}", self.limit));
        }
        if self.offset > 0 {
            sections.push(format!("OFFSET {}", self.offset));
        }

        let sql = sections.join(" ");
        debug!(sql_len = sql.len(), param_count = params.len(), "compiled filter");
        crate::sieve_trace!(sql = %sql, "generated filter sql");
        Ok((sql, params))
    }

    /// Compile only the WHERE section, including the `WHERE` keyword.
    ///
    /// Returns an empty string when there is nothing to filter on.
    pub fn where_sql(&self) -> FilterResult<(String, Vec<FilterValue>)> {
        let mut params = Vec::new();
        let mut parts = Vec::new();

        if self.is_soft_delete_scoped() {
            check_soft_delete_column(&self.soft_delete_column)?;
            parts.push(format!("({} = 0)", self.soft_delete_column));
        }

        for raw in &self.extra {
            parts.push(format!("({})", raw.sql));
            params.extend(raw.params.iter().cloned());
        }

        if let Some(groups) = render_where(&self.where_clause, &mut params)? {
            parts.push(groups);
        }

        if let Some(fluent) = self.render_clauses(&mut params)? {
            parts.push(fluent);
        }

        if parts.is_empty() {
            return Ok((String::new(), params));
        }
        Ok((format!("WHERE {}", parts.join(" AND ")), params))
    }

    fn check_pagination(&self) -> FilterResult<()> {
        if self.limit < 0 {
            return Err(FilterError::invalid_pagination(
                "limit",
                format!("must not be negative, found {}", self.limit),
            ));
        }
        if self.offset < 0 {
            return Err(FilterError::invalid_pagination(
                "offset",
                format!("must not be negative, found {}", self.offset),
            ));
        }
        check_max_limit(self.max_limit)?;
        if let Some(max) = self.max_limit {
            if self.limit > max {
                return Err(FilterError::invalid_pagination(
                    "limit",
                    format!("{} exceeds the maximum of {}", self.limit, max),
                ));
            }
        }
        Ok(())
    }

    /// Render fluent conditions; the OR set disjoins only with fluent AND conditions.
    fn render_clauses(&self, params: &mut Vec<FilterValue>) -> FilterResult<Option<String>> {
        let mut and_parts = Vec::with_capacity(self.and_clauses.len());
        for clause in &self.and_clauses {
            and_parts.push(render_clause(clause, params)?);
        }
        let mut or_parts = Vec::with_capacity(self.or_clauses.len());
        for clause in &self.or_clauses {
            or_parts.push(render_clause(clause, params)?);
        }

        let sql = match (and_parts.is_empty(), or_parts.len()) {
            (true, 0) => return Ok(None),
            (false, 0) => and_parts.join(" AND "),
            (true, 1) => or_parts.remove(0),
            (true, _) => format!("({})", or_parts.join(" OR ")),
            (false, _) => format!("({} OR {})", and_parts.join(" AND "), or_parts.join(" OR ")),
        };
        Ok(Some(sql))
    }
}

fn render_clause(clause: &Clause, params: &mut Vec<FilterValue>) -> FilterResult<String> {
    match clause {
        Clause::Compare {
            field,
            token,
            value,
        } => {
            let expr = Clause::resolve(field, token.as_deref(), value)?;
            Ok(format!("({})", render_expr(field, &expr, params)?))
        }
        Clause::NotIn { field, value } => {
            params.push(value.clone());
            Ok(format!("({} NOT IN (?))", field))
        }
    }
}

/// Render the groups of a [`Where`]; two or more groups are ORed.
fn render_where(where_clause: &Where, params: &mut Vec<FilterValue>) -> FilterResult<Option<String>> {
    let mut groups = Vec::with_capacity(where_clause.len());
    for condition in where_clause {
        groups.push(render_condition(condition, params)?);
    }

    Ok(match groups.len() {
        0 => None,
        1 => groups.pop(),
        _ => Some(format!("({})", groups.join(" OR "))),
    })
}

fn render_condition(condition: &Condition, params: &mut Vec<FilterValue>) -> FilterResult<String> {
    let mut fields = Vec::with_capacity(condition.len());
    for (field, exprs) in condition.iter() {
        let mut rendered = Vec::with_capacity(exprs.len());
        for expr in exprs {
            rendered.push(render_expr(field, expr, params)?);
        }
        if rendered.len() == 1 {
            fields.extend(rendered);
        } else {
            fields.push(format!("({})", rendered.join(" AND ")));
        }
    }
    Ok(format!("({})", fields.join(" AND ")))
}

fn render_expr(field: &str, expr: &Expression, params: &mut Vec<FilterValue>) -> FilterResult<String> {
    let op = expr.op();
    match (op, expr.value()) {
        (Operator::In | Operator::NotIn, FilterValue::List(items)) => {
            if items.is_empty() {
                return Err(FilterError::empty_membership_list(field).with_operator(op.token()));
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            params.extend(items.iter().cloned());
            Ok(format!("{} {} ({})", field, op.as_sql(), placeholders))
        }
        (Operator::Like, value) => {
            params.push(value.clone());
            Ok(format!("{} LIKE ?", field))
        }
        (op, value) => {
            params.push(value.clone());
            Ok(format!("{}{}?", field, op.as_sql()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::parser::parse_where;
    use pretty_assertions::assert_eq;

    fn compile(raw: &str) -> (String, Vec<FilterValue>) {
        Filter::from_where(parse_where(raw.as_bytes()).unwrap())
            .to_sql()
            .unwrap()
    }

    #[test]
    fn test_empty_filter() {
        let (sql, params) = Filter::new().to_sql().unwrap();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_single_field() {
        let (sql, params) = compile(r#"{"status": "active"}"#);
        assert_eq!(sql, "WHERE (status=?)");
        assert_eq!(params, vec![FilterValue::from("active")]);
    }

    #[test]
    fn test_or_groups() {
        let (sql, params) = compile(r#"{"$or": [{"age": {"$gte": 18}}, {"age": {"$lt": 5}}]}"#);
        assert_eq!(sql, "WHERE ((age>=?) OR (age<?))");
        assert_eq!(params, vec![FilterValue::Int(18), FilterValue::Int(5)]);
    }

    #[test]
    fn test_multiple_expressions_on_one_field() {
        let (sql, params) = compile(r#"{"age": {"$gt": 1, "$lte": 9}, "name": {"$like": "a%"}}"#);
        assert_eq!(sql, "WHERE ((age>? AND age<=?) AND name LIKE ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_membership() {
        let (sql, params) = compile(r#"{"id": {"$in": [1, 2, 3]}, "tag": {"$nin": ["x"]}}"#);
        assert_eq!(sql, "WHERE (id IN (?, ?, ?) AND tag NOT IN (?))");
        assert_eq!(
            params,
            vec![FilterValue::Int(1), FilterValue::Int(2), FilterValue::Int(3), FilterValue::from("x")]
        );
    }

    #[test]
    fn test_empty_membership_is_an_error() {
        let filter = Filter::from_where(parse_where(br#"{"id": {"$in": []}}"#).unwrap());
        let err = filter.to_sql().unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyMembershipList);
        assert_eq!(err.context.field.as_deref(), Some("id"));
    }

    #[test]
    fn test_soft_delete_alone() {
        let mut filter = Filter::new();
        filter.soft_delete(true);
        assert_eq!(filter.to_sql().unwrap().0, "WHERE (deleted = 0)");

        filter.unscoped();
        assert_eq!(filter.to_sql().unwrap().0, "");
    }

    #[test]
    fn test_section_order() {
        let mut filter = Filter::from_where(parse_where(br#"{"a": 1}"#).unwrap());
        filter
            .soft_delete(true)
            .add_condition("score > ?", [10])
            .where_("b <>", 2)
            .order("-created")
            .order("name")
            .limit(10)
            .offset(20);

        let (sql, params) = filter.to_sql().unwrap();
        assert_eq!(
            sql,
            "WHERE (deleted = 0) AND (score > ?) AND (a=?) AND (b<>?) \
             ORDER BY created DESC, name LIMIT 10 OFFSET 20"
        );
        assert_eq!(params, vec![FilterValue::Int(10), FilterValue::Int(1), FilterValue::Int(2)]);
    }

    #[test]
    fn test_fluent_or() {
        let mut filter = Filter::new();
        filter.or("a", 1);
        assert_eq!(filter.to_sql().unwrap().0, "WHERE (a=?)");

        filter.or("b", 2);
        assert_eq!(filter.to_sql().unwrap().0, "WHERE ((a=?) OR (b=?))");

        filter.where_("c", 3).soft_delete(true);
        let (sql, params) = filter.to_sql().unwrap();
        assert_eq!(sql, "WHERE (deleted = 0) AND ((c=?) OR (a=?) OR (b=?))");
        assert_eq!(params, vec![FilterValue::Int(3), FilterValue::Int(1), FilterValue::Int(2)]);
    }

    #[test]
    fn test_fluent_or_is_anded_with_parsed_groups() {
        let mut filter = Filter::from_where(parse_where(br#"{"a": 1}"#).unwrap());
        filter.or("b", 2);
        let (sql, params) = filter.to_sql().unwrap();
        assert_eq!(sql, "WHERE (a=?) AND (b=?)");
        assert_eq!(params, vec![FilterValue::Int(1), FilterValue::Int(2)]);
    }

    #[test]
    fn test_fluent_not_binds_whole_value() {
        let mut filter = Filter::new();
        filter.not("id", vec![1, 2]);
        let (sql, params) = filter.to_sql().unwrap();
        assert_eq!(sql, "WHERE (id NOT IN (?))");
        assert_eq!(params, vec![FilterValue::from(vec![1, 2])]);
    }

    #[test]
    fn test_fluent_errors_are_fatal() {
        let mut filter = Filter::new();
        filter.where_("age ~", 1);
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::UnknownOperator);

        let mut filter = Filter::new();
        filter.where_("name LIKE", 3);
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::UnsupportedOperand);

        let mut filter = Filter::new();
        filter.where_("id", Vec::<i64>::new());
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::EmptyMembershipList);
    }

    #[test]
    fn test_pagination_validation() {
        let mut filter = Filter::new();
        filter.limit(-1);
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::InvalidPagination);

        let mut filter = Filter::new();
        filter.offset(-5);
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::InvalidPagination);

        let config = crate::config::FilterConfig::new().with_max_limit(50);
        let mut filter = Filter::with_config(&config);
        filter.limit(51);
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::InvalidPagination);
        filter.limit(50);
        assert_eq!(filter.to_sql().unwrap().0, "LIMIT 50");
    }

    #[test]
    fn test_offset_without_limit() {
        let mut filter = Filter::new();
        filter.offset(5);
        assert_eq!(filter.to_sql().unwrap().0, "OFFSET 5");
    }

    #[test]
    fn test_custom_soft_delete_column() {
        let config = crate::config::FilterConfig::new()
            .with_soft_delete(true)
            .with_soft_delete_column("removed");
        let (sql, _) = Filter::with_config(&config).to_sql().unwrap();
        assert_eq!(sql, "WHERE (removed = 0)");
    }

    #[test]
    fn test_unchecked_config_is_rejected() {
        let config = crate::config::FilterConfig::new()
            .with_soft_delete(true)
            .with_soft_delete_column("1) OR (1");
        let err = Filter::with_config(&config).to_sql().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);

        let mut filter = Filter::with_config(&config);
        filter.unscoped();
        assert_eq!(filter.to_sql().unwrap().0, "");

        let config = crate::config::FilterConfig::new().with_max_limit(-1);
        let mut filter = Filter::with_config(&config);
        filter.limit(1);
        assert_eq!(filter.to_sql().unwrap_err().code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_compile_is_repeatable() {
        let mut filter = Filter::from_where(parse_where(br#"{"id": {"$in": [1, 2]}}"#).unwrap());
        filter.where_("x >", 1).order("y");
        assert_eq!(filter.to_sql().unwrap(), filter.to_sql().unwrap());
    }
}
