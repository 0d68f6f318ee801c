//! Expressions and per-group conditions.

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;

use crate::error::{ErrorCode, FilterError, FilterResult};
use crate::operator::Operator;
use crate::value::FilterValue;

/// Expressions attached to one field. Most fields carry one or two.
pub type ExpressionList = SmallVec<[Expression; 2]>;

/// An operator applied to an operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    op: Operator,
    value: FilterValue,
}

impl Expression {
    /// Create an expression, checking that the operand fits the operator.
    ///
    /// `$in`/`$nin` take a list of scalars, `$like` takes a string, and
    /// everything else takes a single bool, string or integer.
    ///
    /// ```rust
    /// use sieve_query::{Expression, FilterValue, Operator};
    ///
    /// assert!(Expression::new(Operator::In, FilterValue::from(vec![1, 2])).is_ok());
    /// assert!(Expression::new(Operator::In, FilterValue::Int(1)).is_err());
    /// assert!(Expression::new(Operator::Like, FilterValue::Int(1)).is_err());
    /// ```
    pub fn new(op: Operator, value: FilterValue) -> FilterResult<Self> {
        let ok = match (&op, &value) {
            (Operator::In | Operator::NotIn, FilterValue::List(items)) => {
                items.iter().all(FilterValue::is_scalar)
            }
            (Operator::In | Operator::NotIn, _) => false,
            (Operator::Like, FilterValue::String(_)) => true,
            (Operator::Like, _) => false,
            (_, FilterValue::List(_)) => false,
            _ => true,
        };

        if ok {
            Ok(Self { op, value })
        } else {
            Err(FilterError::new(
                ErrorCode::UnsupportedOperand,
                format!("{} does not accept {} operands", op, value.type_name()),
            )
            .with_operator(op.token()))
        }
    }

    /// Shorthand for an `$eq` expression.
    pub fn eq(value: impl Into<FilterValue>) -> FilterResult<Self> {
        Self::new(Operator::Eq, value.into())
    }

    /// The operator.
    pub fn op(&self) -> Operator {
        self.op
    }

    /// The operand.
    pub fn value(&self) -> &FilterValue {
        &self.value
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}:{}}}", self.op, self.value)
    }
}

/// A conjunction of per-field expressions.
///
/// Fields keep insertion order, and expressions on the same field are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    fields: IndexMap<String, ExpressionList>,
}

impl Condition {
    /// Create an empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression to a field.
    pub fn push(&mut self, field: impl Into<String>, expr: Expression) -> &mut Self {
        self.fields.entry(field.into()).or_default().push(expr);
        self
    }

    /// Add a field with its expressions. Empty lists are ignored.
    pub fn insert(&mut self, field: impl Into<String>, exprs: ExpressionList) {
        if !exprs.is_empty() {
            self.fields.insert(field.into(), exprs);
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, field: impl Into<String>, expr: Expression) -> Self {
        self.push(field, expr);
        self
    }

    /// Check if no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of constrained fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Expressions for a field.
    pub fn get(&self, field: &str) -> Option<&[Expression]> {
        self.fields.get(field).map(|exprs| exprs.as_slice())
    }

    /// Iterate fields and their expressions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Expression])> {
        self.fields
            .iter()
            .map(|(field, exprs)| (field.as_str(), exprs.as_slice()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (field, exprs) in self.iter() {
            write!(f, "{{{}:[", field)?;
            for expr in exprs {
                write!(f, "{}", expr)?;
            }
            f.write_str("]}")?;
        }
        f.write_str("]")
    }
}
