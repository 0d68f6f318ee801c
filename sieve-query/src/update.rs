//! Partial-update SET clauses.
//!
//! A record type lists its fields once, in declaration order, as
//! [`FieldDescriptor`]s. [`SetClauseBuilder`] walks that list and emits
//! `column=?` for every field that should be written:
//!
//! - immutable fields (primary key, creation time, soft-delete marker) never
//!   appear
//! - the modification-time field always appears, bound to the current time
//! - every other field appears only when it is present, meaning a `Some`
//!   option or a non-empty vector
//!
//! Descriptors are normally generated with `#[derive(UpdateSet)]`; the
//! hand-written form looks like this:
//!
//! ```rust
//! use sieve_query::update::{FieldDescriptor, Presence, SetClauseBuilder, UpdateRecord};
//!
//! struct User {
//!     id: i64,
//!     display_name: Option<String>,
//!     modified: Option<i64>,
//! }
//!
//! impl UpdateRecord for User {
//!     const FIELDS: &'static [FieldDescriptor<Self>] = &[
//!         FieldDescriptor::immutable("id"),
//!         FieldDescriptor::mutable("display_name", |r: &User| r.display_name.present_value()),
//!         FieldDescriptor::modified("modified"),
//!     ];
//! }
//!
//! let user = User { id: 1, display_name: Some("ada".into()), modified: None };
//! let (sql, params) = SetClauseBuilder::new().build(&user);
//! assert_eq!(sql, "display_name=?, modified=?");
//! assert_eq!(params.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

use crate::error::{FilterError, FilterResult};
use crate::filter::Filter;
use crate::naming::{FieldNamer, SnakeCaseNamer};
use crate::value::FilterValue;

/// How a field takes part in updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Written when present.
    Mutable,
    /// Never written.
    Immutable,
    /// Always written with the current time.
    Modified,
}

/// Static description of one record field.
pub struct FieldDescriptor<R> {
    /// Declared field name.
    pub name: &'static str,
    /// Column override; the namer maps `name` when unset.
    pub column: Option<&'static str>,
    /// Update behavior.
    pub kind: FieldKind,
    /// Reads the field, returning `None` when it is absent.
    pub value: fn(&R) -> Option<FilterValue>,
}

fn absent<R>(_: &R) -> Option<FilterValue> {
    None
}

impl<R> FieldDescriptor<R> {
    /// A field written only when present.
    pub const fn mutable(name: &'static str, value: fn(&R) -> Option<FilterValue>) -> Self {
        Self {
            name,
            column: None,
            kind: FieldKind::Mutable,
            value,
        }
    }

    /// A field that is never written.
    pub const fn immutable(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            kind: FieldKind::Immutable,
            value: absent::<R>,
        }
    }

    /// The modification-time field.
    pub const fn modified(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            kind: FieldKind::Modified,
            value: absent::<R>,
        }
    }

    /// Use an explicit column name.
    pub const fn column(self, column: &'static str) -> Self {
        Self {
            column: Some(column),
            ..self
        }
    }

    /// Column name, mapping the declared name when no override is set.
    pub fn column_name(&self, namer: &impl FieldNamer) -> String {
        match self.column {
            Some(column) => column.to_string(),
            None => namer.field_name(self.name),
        }
    }
}

impl<R> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldDescriptor<R> {}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A record type whose fields can be written by partial updates.
pub trait UpdateRecord: Sized + 'static {
    /// Field descriptors in declaration order.
    const FIELDS: &'static [FieldDescriptor<Self>];
}

/// Presence test for optional field shapes.
pub trait Presence {
    /// The bound value when the field is set, `None` otherwise.
    fn present_value(&self) -> Option<FilterValue>;
}

impl<T> Presence for Option<T>
where
    T: Clone + Into<FilterValue>,
{
    fn present_value(&self) -> Option<FilterValue> {
        self.clone().map(Into::into)
    }
}

impl<T> Presence for Vec<T>
where
    T: Clone + Into<FilterValue>,
{
    fn present_value(&self) -> Option<FilterValue> {
        if self.is_empty() {
            None
        } else {
            Some(FilterValue::List(self.iter().cloned().map(Into::into).collect()))
        }
    }
}

/// Builds `col=?, col=?` SET lists from [`UpdateRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct SetClauseBuilder<N = SnakeCaseNamer> {
    namer: N,
}

impl SetClauseBuilder {
    /// Create a builder with snake_case column names.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N: FieldNamer> SetClauseBuilder<N> {
    /// Create a builder with a custom column namer.
    pub fn with_namer(namer: N) -> Self {
        Self { namer }
    }

    /// Build the SET list, stamping the modification field with the current time.
    pub fn build<R: UpdateRecord>(&self, record: &R) -> (String, Vec<FilterValue>) {
        self.build_at(record, Utc::now())
    }

    /// Build the SET list with an explicit modification time.
    pub fn build_at<R: UpdateRecord>(
        &self,
        record: &R,
        now: DateTime<Utc>,
    ) -> (String, Vec<FilterValue>) {
        let mut parts = Vec::with_capacity(R::FIELDS.len());
        let mut params = Vec::with_capacity(R::FIELDS.len());

        for field in R::FIELDS {
            let value = match field.kind {
                FieldKind::Immutable => continue,
                FieldKind::Modified => FilterValue::from(now),
                FieldKind::Mutable => match (field.value)(record) {
                    Some(value) => value,
                    None => continue,
                },
            };
            parts.push(format!("{}=?", field.column_name(&self.namer)));
            params.push(value);
        }

        (parts.join(", "), params)
    }
}

/// Build the SET list for a record with snake_case column names.
pub fn build_set_clause<R: UpdateRecord>(record: &R) -> (String, Vec<FilterValue>) {
    SetClauseBuilder::new().build(record)
}

/// Build a complete `UPDATE table SET ... [WHERE ...]` statement.
///
/// SET parameters come first, followed by the filter's WHERE parameters.
/// Ordering and pagination on the filter are not used.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidParameter`](crate::ErrorCode::InvalidParameter)
/// when the record has nothing to write, and any error from compiling the
/// filter's WHERE section.
pub fn build_update_sql<R: UpdateRecord>(
    table: &str,
    record: &R,
    filter: &Filter,
) -> FilterResult<(String, Vec<FilterValue>)> {
    let (set_sql, mut params) = build_set_clause(record);
    if set_sql.is_empty() {
        return Err(FilterError::invalid_parameter(format!(
            "update of {} has no fields to set",
            table
        )));
    }

    let mut sql = format!("UPDATE {} SET {}", table, set_sql);
    let (where_sql, where_params) = filter.where_sql()?;
    if !where_sql.is_empty() {
        sql.push(' ');
        sql.push_str(&where_sql);
        params.extend(where_params);
    }

    debug!(table, param_count = params.len(), "built update statement");
    Ok((sql, params))
}
