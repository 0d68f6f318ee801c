//! # sieve-query
//!
//! Filter-expression parser and parameterized SQL compiler.
//!
//! This crate turns a JSON filter (or a filter built in code) into a SQL
//! fragment plus positional parameters:
//! - JSON parsing with `$or` groups and `$eq`/`$in`/`$like`-style operators
//! - A fluent builder (`where_`, `or`, `not`, `order`, `limit`, `offset`)
//! - Soft-delete scoping and raw pass-through predicates
//! - Query-string extraction (`where`, `order`, `limit`, `skip`)
//! - Partial-update SET clauses
//!
//! The compiler never touches a database. It produces `(sql, params)` with
//! `?` placeholders and leaves execution to the caller.
//!
//! ## Parsing
//!
//! ```rust
//! use sieve_query::{parse_where, Filter, FilterValue};
//!
//! let w = parse_where(br#"{"age": {"$gte": 18}, "role": {"$in": ["admin", "owner"]}}"#).unwrap();
//! let (sql, params) = Filter::from_where(w).to_sql().unwrap();
//!
//! assert_eq!(sql, "WHERE (age>=? AND role IN (?, ?))");
//! assert_eq!(params, vec![FilterValue::Int(18), "admin".into(), "owner".into()]);
//! ```
//!
//! ## Disjunctions
//!
//! ```rust
//! use sieve_query::{parse_where, Filter};
//!
//! let w = parse_where(br#"{"$or": [{"age": {"$gte": 18}}, {"age": {"$lt": 5}}]}"#).unwrap();
//! let (sql, _) = Filter::from_where(w).to_sql().unwrap();
//! assert_eq!(sql, "WHERE ((age>=?) OR (age<?))");
//! ```
//!
//! ## Fluent filters
//!
//! ```rust
//! use sieve_query::Filter;
//!
//! let mut filter = Filter::new();
//! filter
//!     .soft_delete(true)
//!     .where_("name LIKE", "a%")
//!     .not("status", "banned")
//!     .order("-created")
//!     .limit(10);
//!
//! let (sql, params) = filter.to_sql().unwrap();
//! assert_eq!(
//!     sql,
//!     "WHERE (deleted = 0) AND (name LIKE ?) AND (status NOT IN (?)) ORDER BY created DESC LIMIT 10"
//! );
//! assert_eq!(params.len(), 2);
//! ```
//!
//! ## Error handling
//!
//! Every fallible operation returns [`FilterResult`]. Errors carry an
//! [`ErrorCode`] and context about the offending field:
//!
//! ```rust
//! use sieve_query::{parse_where, ErrorCode};
//!
//! let err = parse_where(br#"{"id": [1, 2]}"#).unwrap_err();
//! assert_eq!(err.code, ErrorCode::MalformedInput);
//! println!("{}", err.display_full());
//! ```

pub mod compile;
pub mod config;
pub mod error;
pub mod expr;
pub mod filter;
pub mod logging;
pub mod naming;
pub mod operator;
pub mod parser;
pub mod query_string;
pub mod types;
pub mod update;
pub mod value;
pub mod where_clause;

pub use config::{EnvSource, FilterConfig, MapEnvSource, StdEnvSource};
pub use error::{ErrorCode, ErrorContext, FilterError, FilterResult};
pub use expr::{Condition, Expression, ExpressionList};
pub use filter::{Filter, RawCondition};
pub use naming::{FieldNamer, IdentityNamer, SnakeCaseNamer};
pub use operator::Operator;
pub use parser::{ParsedWhere, parse_where, parse_where_with_diagnostics};
pub use query_string::FilterParams;
pub use types::{OrderBy, OrderByField, SortOrder};
pub use update::{
    FieldDescriptor, FieldKind, Presence, SetClauseBuilder, UpdateRecord, build_set_clause,
    build_update_sql,
};
pub use value::FilterValue;
pub use where_clause::Where;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::config::FilterConfig;
    pub use crate::error::{ErrorCode, FilterError, FilterResult};
    pub use crate::filter::Filter;
    pub use crate::operator::Operator;
    pub use crate::parser::parse_where;
    pub use crate::update::{Presence, UpdateRecord, build_update_sql};
    pub use crate::value::FilterValue;
    pub use crate::where_clause::Where;
}
