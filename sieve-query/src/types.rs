//! Sort keys for the ORDER BY clause.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByField {
    /// The column name to order by.
    pub column: Cow<'static, str>,
    /// The sort order.
    pub order: SortOrder,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(column: impl Into<Cow<'static, str>>, order: SortOrder) -> Self {
        Self {
            column: column.into(),
            order,
        }
    }

    /// Create an ascending order.
    pub fn asc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Asc)
    }

    /// Create a descending order.
    pub fn desc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SortOrder::Desc)
    }

    /// Parse a sort token.
    ///
    /// A leading `-` means descending. A trailing `ASC`/`DESC` keyword is
    /// accepted too. Blank tokens yield `None`.
    ///
    /// ```rust
    /// use sieve_query::types::{OrderByField, SortOrder};
    ///
    /// assert_eq!(OrderByField::parse("-created"), Some(OrderByField::desc("created")));
    /// assert_eq!(OrderByField::parse("name"), Some(OrderByField::asc("name")));
    /// assert_eq!(OrderByField::parse("name desc").unwrap().order, SortOrder::Desc);
    /// assert_eq!(OrderByField::parse("  "), None);
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(column) = token.strip_prefix('-') {
            let column = column.trim();
            return (!column.is_empty()).then(|| Self::desc(column.to_string()));
        }

        let mut words = token.split_whitespace();
        let column = words.next()?;
        let order = match words.next() {
            Some(kw) if kw.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Some(Self::new(column.to_string(), order))
    }

    /// Write the SQL directly to a buffer.
    ///
    /// Ascending keys are written without a keyword.
    #[inline]
    pub fn write_sql(&self, buffer: &mut String) {
        buffer.push_str(&self.column);
        if self.order == SortOrder::Desc {
            buffer.push_str(" DESC");
        }
    }

    /// Generate the SQL for this order by field.
    pub fn to_sql(&self) -> String {
        let mut sql = String::with_capacity(self.column.len() + 5);
        self.write_sql(&mut sql);
        sql
    }
}

/// An ordered list of sort keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    fields: Vec<OrderByField>,
}

impl OrderBy {
    /// Create an empty order by (no ordering).
    pub fn none() -> Self {
        Self::default()
    }

    /// Create an OrderBy from multiple fields.
    pub fn from_fields(fields: impl IntoIterator<Item = OrderByField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list of sort tokens, e.g. `"-created,name"`.
    pub fn parse(list: &str) -> Self {
        Self::from_fields(list.split(',').filter_map(OrderByField::parse))
    }

    /// Add a field to the order by.
    pub fn then(mut self, field: OrderByField) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a field in place.
    pub fn push(&mut self, field: OrderByField) {
        self.fields.push(field);
    }

    /// Remove every field.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Check if the order by is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get the fields in order.
    pub fn fields(&self) -> &[OrderByField] {
        &self.fields
    }

    /// Write the ORDER BY list (without the keyword) to a buffer.
    ///
    /// ```rust
    /// use sieve_query::types::{OrderBy, OrderByField};
    ///
    /// let order = OrderBy::from_fields([
    ///     OrderByField::desc("created_at"),
    ///     OrderByField::asc("id"),
    /// ]);
    /// let mut buffer = String::from("ORDER BY ");
    /// order.write_sql(&mut buffer);
    /// assert_eq!(buffer, "ORDER BY created_at DESC, id");
    /// ```
    pub fn write_sql(&self, buffer: &mut String) {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                buffer.push_str(", ");
            }
            field.write_sql(buffer);
        }
    }

    /// Generate the ORDER BY list (without the keyword).
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        self.write_sql(&mut sql);
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_skips_blank_tokens() {
        let order = OrderBy::parse("-created,,name, -score");
        assert_eq!(order.to_sql(), "created DESC, name, score DESC");
    }

    #[test]
    fn test_lone_dash_is_ignored() {
        assert_eq!(OrderByField::parse("-"), None);
        assert!(OrderBy::parse("-").is_empty());
    }

    #[test]
    fn test_explicit_asc_keyword() {
        assert_eq!(OrderByField::parse("name ASC"), Some(OrderByField::asc("name")));
    }
}
