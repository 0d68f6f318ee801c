//! # Sieve
//!
//! Compile JSON filter expressions and partial updates into parameterized SQL.
//!
//! Sieve provides:
//! - A parser for `{"field": {"$op": value}}` filter payloads with `$or` groups
//! - A fluent builder for filters assembled in code
//! - A compiler producing `WHERE ... ORDER BY ... LIMIT ... OFFSET ...` with `?` placeholders
//! - A derive macro for partial-update `SET` clauses
//!
//! Sieve never executes SQL. Hand the `(sql, params)` pair to your driver.
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//!
//! let config = FilterConfig::new().with_soft_delete(true);
//! let filter = Filter::from_query(
//!     "where=%7B%22age%22%3A%7B%22%24gte%22%3A18%7D%7D&order=-created&limit=20",
//!     &config,
//! )
//! .unwrap();
//!
//! let (sql, params) = filter.to_sql().unwrap();
//! assert_eq!(sql, "WHERE (deleted = 0) AND (age>=?) ORDER BY created DESC LIMIT 20");
//! assert_eq!(params, vec![FilterValue::Int(18)]);
//! ```
//!
//! ## Partial updates
//!
//! ```rust
//! use sieve::prelude::*;
//!
//! #[derive(UpdateSet)]
//! struct User {
//!     id: i64,
//!     name: Option<String>,
//!     email: Option<String>,
//!     modified: i64,
//! }
//!
//! let user = User { id: 1, name: Some("ada".into()), email: None, modified: 0 };
//! let mut filter = Filter::new();
//! filter.where_("id", user.id);
//!
//! let (sql, params) = build_update_sql("users", &user, &filter).unwrap();
//! assert_eq!(sql, "UPDATE users SET name=?, modified=? WHERE (id=?)");
//! assert_eq!(params.len(), 3);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use sieve_query::*;

// Re-export proc macros
pub use sieve_codegen::UpdateSet;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::UpdateSet;
    pub use sieve_query::prelude::*;
}
