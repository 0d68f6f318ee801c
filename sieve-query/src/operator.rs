//! Comparison operators supported in filter expressions.

use std::fmt;

/// A comparison operator.
///
/// Each operator has exactly one JSON token (`$eq`, `$in`, ...) and one SQL
/// token (`=`, `IN`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (`$eq`, `=`).
    Eq,
    /// Less than (`$lt`, `<`).
    Lt,
    /// Less than or equal (`$lte`, `<=`).
    Lte,
    /// Greater than (`$gt`, `>`).
    Gt,
    /// Greater than or equal (`$gte`, `>=`).
    Gte,
    /// Not equal (`$ne`, `<>`).
    Ne,
    /// Membership (`$in`, `IN`).
    In,
    /// Non-membership (`$nin`, `NOT IN`).
    NotIn,
    /// Pattern match (`$like`, `LIKE`).
    Like,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 9] = [
        Self::Eq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Ne,
        Self::In,
        Self::NotIn,
        Self::Like,
    ];

    /// Look up an operator by its JSON token.
    ///
    /// ```rust
    /// use sieve_query::Operator;
    ///
    /// assert_eq!(Operator::from_token("$gte"), Some(Operator::Gte));
    /// assert_eq!(Operator::from_token("gte"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "$eq" => Some(Self::Eq),
            "$lt" => Some(Self::Lt),
            "$lte" => Some(Self::Lte),
            "$gt" => Some(Self::Gt),
            "$gte" => Some(Self::Gte),
            "$ne" => Some(Self::Ne),
            "$in" => Some(Self::In),
            "$nin" => Some(Self::NotIn),
            "$like" => Some(Self::Like),
            _ => None,
        }
    }

    /// Look up an operator by its SQL spelling, as written in fluent field
    /// expressions such as `"age >="`. Keywords are case-insensitive and
    /// `!=` is accepted for `<>`.
    pub fn from_sql(token: &str) -> Option<Self> {
        let normalized = token.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" => Some(Self::Eq),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<>" | "!=" => Some(Self::Ne),
            "IN" => Some(Self::In),
            "NOT IN" => Some(Self::NotIn),
            "LIKE" => Some(Self::Like),
            _ => None,
        }
    }

    /// The JSON token for this operator.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Ne => "$ne",
            Self::In => "$in",
            Self::NotIn => "$nin",
            Self::Like => "$like",
        }
    }

    /// The SQL token for this operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Ne => "<>",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
        }
    }

    /// Whether the operand must be a list.
    #[inline]
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_covers_all() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_token(op.token()), Some(op));
            assert_eq!(Operator::from_sql(op.as_sql()), Some(op));
        }
    }

    #[test]
    fn test_unknown_tokens() {
        assert_eq!(Operator::from_token("$between"), None);
        assert_eq!(Operator::from_token("eq"), None);
        assert_eq!(Operator::from_sql("~"), None);
    }

    #[test]
    fn test_sql_spellings() {
        assert_eq!(Operator::from_sql("!="), Some(Operator::Ne));
        assert_eq!(Operator::from_sql("not  in"), Some(Operator::NotIn));
        assert_eq!(Operator::from_sql("like"), Some(Operator::Like));
    }
}
