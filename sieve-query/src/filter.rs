//! The filter aggregate and its fluent builder.
//!
//! A [`Filter`] gathers everything that ends up after `FROM table`: the
//! parsed [`Where`] groups, fluent conditions, raw predicates, ordering,
//! pagination and soft-delete handling. It is compiled with
//! [`Filter::to_sql`].
//!
//! # Fluent construction
//!
//! ```rust
//! use sieve_query::Filter;
//!
//! let mut filter = Filter::new();
//! filter
//!     .where_("age >=", 18)
//!     .where_("role", vec!["admin", "owner"])
//!     .order("-created")
//!     .limit(20);
//!
//! let (sql, params) = filter.to_sql().unwrap();
//! assert_eq!(sql, "WHERE (age>=?) AND (role IN (?, ?)) ORDER BY created DESC LIMIT 20");
//! assert_eq!(params.len(), 3);
//! ```

use std::borrow::Cow;

use crate::config::{DEFAULT_SOFT_DELETE_COLUMN, FilterConfig};
use crate::error::{FilterError, FilterResult};
use crate::expr::Expression;
use crate::operator::Operator;
use crate::types::{OrderBy, OrderByField};
use crate::value::FilterValue;
use crate::where_clause::Where;

/// A literal SQL predicate with its own positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCondition {
    /// SQL text containing one `?` per parameter.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<FilterValue>,
}

/// A condition added through the fluent builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Clause {
    /// `where_` / `or`: a field with an optional SQL comparison token.
    Compare {
        field: String,
        token: Option<String>,
        value: FilterValue,
    },
    /// `not`: `field NOT IN (?)` with the whole value as one parameter.
    NotIn { field: String, value: FilterValue },
}

impl Clause {
    fn compare(expr: &str, value: FilterValue) -> Self {
        let (field, token) = split_field_expr(expr);
        Self::Compare {
            field: field.to_string(),
            token: token.map(str::to_string),
            value,
        }
    }

    /// Resolve a comparison clause into an expression.
    ///
    /// A list operand turns `=` (or no operator) into `IN` and `<>` into
    /// `NOT IN`.
    pub(crate) fn resolve(
        field: &str,
        token: Option<&str>,
        value: &FilterValue,
    ) -> FilterResult<Expression> {
        let op = match token {
            None => Operator::Eq,
            Some(token) => Operator::from_sql(token)
                .ok_or_else(|| FilterError::unknown_operator(field, token))?,
        };
        let op = match (op, value.is_list()) {
            (Operator::Eq, true) => Operator::In,
            (Operator::Ne, true) => Operator::NotIn,
            (op, _) => op,
        };
        Expression::new(op, value.clone()).map_err(|err| err.with_field(field))
    }
}

/// Split `"age >="` into the field and the trailing comparison token.
fn split_field_expr(expr: &str) -> (&str, Option<&str>) {
    let expr = expr.trim();
    let end = expr
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
        .unwrap_or(expr.len());
    let (field, rest) = expr.split_at(end);
    let rest = rest.trim();
    (field, (!rest.is_empty()).then_some(rest))
}

/// A complete filter that compiles to a WHERE/ORDER BY/LIMIT/OFFSET fragment.
///
/// Builder methods take `&mut self` and return `&mut Self` so calls chain on
/// one instance. Compiling never mutates the filter, so the same filter
/// compiles to the same SQL every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub(crate) where_clause: Where,
    pub(crate) and_clauses: Vec<Clause>,
    pub(crate) or_clauses: Vec<Clause>,
    pub(crate) extra: Vec<RawCondition>,
    pub(crate) order_by: OrderBy,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
    pub(crate) soft_delete: bool,
    pub(crate) soft_delete_column: Cow<'static, str>,
    pub(crate) max_limit: Option<i64>,
    pub(crate) unscoped: bool,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            where_clause: Where::new(),
            and_clauses: Vec::new(),
            or_clauses: Vec::new(),
            extra: Vec::new(),
            order_by: OrderBy::none(),
            limit: 0,
            offset: 0,
            soft_delete: false,
            soft_delete_column: Cow::Borrowed(DEFAULT_SOFT_DELETE_COLUMN),
            max_limit: None,
            unscoped: false,
        }
    }
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty filter using shared settings.
    pub fn with_config(config: &FilterConfig) -> Self {
        Self {
            soft_delete: config.soft_delete,
            soft_delete_column: Cow::Owned(config.soft_delete_column.clone()),
            max_limit: config.max_limit,
            ..Self::default()
        }
    }

    /// Create a filter around a parsed where clause.
    pub fn from_where(where_clause: Where) -> Self {
        Self {
            where_clause,
            ..Self::default()
        }
    }

    /// Replace the parsed where clause.
    pub fn set_where(&mut self, where_clause: Where) -> &mut Self {
        self.where_clause = where_clause;
        self
    }

    /// Append a condition ANDed with the others.
    ///
    /// `expr` is a field name optionally followed by a comparison such as
    /// `"age >"` or `"name LIKE"`; without one, a scalar compares with `=`
    /// and a list becomes `IN (...)`.
    pub fn where_(&mut self, expr: &str, value: impl Into<FilterValue>) -> &mut Self {
        self.and_clauses.push(Clause::compare(expr, value.into()));
        self
    }

    /// Append a condition to the OR set.
    ///
    /// The OR set only disjoins with conditions added through [`Filter::where_`]
    /// and [`Filter::not`]: those render as `(a AND b OR c)`. The soft-delete
    /// predicate, raw conditions and parsed [`Where`] groups are always ANDed
    /// ahead of it, so `{"a": 1}` followed by `.or("b", 2)` compiles to
    /// `WHERE (a=?) AND (b=?)`.
    pub fn or(&mut self, expr: &str, value: impl Into<FilterValue>) -> &mut Self {
        self.or_clauses.push(Clause::compare(expr, value.into()));
        self
    }

    /// Append `field NOT IN (?)`, ANDed with the other conditions.
    ///
    /// The whole value is bound as a single parameter, so a scalar acts as a
    /// one-element membership test rather than an inequality.
    pub fn not(&mut self, field: &str, value: impl Into<FilterValue>) -> &mut Self {
        self.and_clauses.push(Clause::NotIn {
            field: field.trim().to_string(),
            value: value.into(),
        });
        self
    }

    /// Append a sort key such as `"name"` or `"-created"`. Blank values are ignored.
    pub fn order(&mut self, value: &str) -> &mut Self {
        if let Some(field) = OrderByField::parse(value) {
            self.order_by.push(field);
        }
        self
    }

    /// Replace every sort key with `value`; a blank value clears the ordering.
    pub fn reorder(&mut self, value: &str) -> &mut Self {
        self.order_by.clear();
        self.order(value)
    }

    /// Append a typed sort key.
    pub fn order_by(&mut self, field: OrderByField) -> &mut Self {
        self.order_by.push(field);
        self
    }

    /// Set the LIMIT. Zero leaves it out.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.limit = n;
        self
    }

    /// Set the OFFSET. Zero leaves it out.
    pub fn offset(&mut self, n: i64) -> &mut Self {
        self.offset = n;
        self
    }

    /// Enable or disable the soft-delete predicate.
    pub fn soft_delete(&mut self, enabled: bool) -> &mut Self {
        self.soft_delete = enabled;
        self
    }

    /// Skip the soft-delete predicate for this filter.
    pub fn unscoped(&mut self) -> &mut Self {
        self.unscoped = true;
        self
    }

    /// Add a literal SQL predicate with its own parameters.
    ///
    /// ```rust
    /// use sieve_query::Filter;
    ///
    /// let mut filter = Filter::new();
    /// filter.add_condition("MATCH(body) AGAINST(?)", ["rust"]);
    /// let (sql, params) = filter.to_sql().unwrap();
    /// assert_eq!(sql, "WHERE (MATCH(body) AGAINST(?))");
    /// assert_eq!(params.len(), 1);
    /// ```
    pub fn add_condition<V: Into<FilterValue>>(
        &mut self,
        sql: impl Into<String>,
        params: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.extra.push(RawCondition {
            sql: sql.into(),
            params: params.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// The parsed where clause.
    pub fn where_clause(&self) -> &Where {
        &self.where_clause
    }

    /// The sort keys.
    pub fn orders(&self) -> &OrderBy {
        &self.order_by
    }

    /// The requested LIMIT (0 = none).
    pub fn limit_value(&self) -> i64 {
        self.limit
    }

    /// The requested OFFSET (0 = none).
    pub fn offset_value(&self) -> i64 {
        self.offset
    }

    /// Whether the soft-delete predicate will be emitted.
    pub fn is_soft_delete_scoped(&self) -> bool {
        self.soft_delete && !self.unscoped
    }
}

impl From<Where> for Filter {
    fn from(where_clause: Where) -> Self {
        Self::from_where(where_clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_split_field_expr() {
        assert_eq!(split_field_expr("age"), ("age", None));
        assert_eq!(split_field_expr(" age >= "), ("age", Some(">=")));
        assert_eq!(split_field_expr("age>"), ("age", Some(">")));
        assert_eq!(split_field_expr("u.name like"), ("u.name", Some("like")));
        assert_eq!(split_field_expr("id NOT IN"), ("id", Some("NOT IN")));
    }

    #[test]
    fn test_resolve_list_operands() {
        let list = FilterValue::from(vec![1, 2]);
        assert_eq!(Clause::resolve("id", None, &list).unwrap().op(), Operator::In);
        assert_eq!(Clause::resolve("id", Some("="), &list).unwrap().op(), Operator::In);
        assert_eq!(Clause::resolve("id", Some("!="), &list).unwrap().op(), Operator::NotIn);

        let err = Clause::resolve("id", Some(">"), &list).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperand);
        assert_eq!(err.context.field.as_deref(), Some("id"));
    }

    #[test]
    fn test_resolve_unknown_token() {
        let err = Clause::resolve("age", Some("~"), &FilterValue::Int(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownOperator);
    }

    #[test]
    fn test_order_and_reorder() {
        let mut filter = Filter::new();
        filter.order("-created").order("").order("name");
        assert_eq!(filter.orders().to_sql(), "created DESC, name");

        filter.reorder("score");
        assert_eq!(filter.orders().to_sql(), "score");

        filter.reorder("");
        assert!(filter.orders().is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = FilterConfig::new()
            .with_soft_delete(true)
            .with_soft_delete_column("removed");
        let mut filter = Filter::with_config(&config);
        assert!(filter.is_soft_delete_scoped());

        filter.unscoped();
        assert!(!filter.is_soft_delete_scoped());
    }
}
