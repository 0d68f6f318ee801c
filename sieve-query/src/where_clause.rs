//! Disjunctions of conditions.

use std::fmt;

use crate::expr::Condition;

/// An ordered disjunction of [`Condition`] groups.
///
/// Zero or one group needs no outer grouping; two or more groups are ORed
/// together when compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Where {
    conditions: Vec<Condition>,
}

impl Where {
    /// Create an empty where clause (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a where clause from a single condition group.
    pub fn single(condition: Condition) -> Self {
        let mut w = Self::new();
        w.push(condition);
        w
    }

    /// Create a where clause whose groups are ORed together.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut w = Self::new();
        for condition in conditions {
            w.push(condition);
        }
        w
    }

    /// Append a condition group. Empty groups are ignored.
    pub fn push(&mut self, condition: Condition) {
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
    }

    /// Check if there are no condition groups.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of condition groups.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Iterate condition groups in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }
}

impl<'a> IntoIterator for &'a Where {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Condition> for Where {
    fn from(condition: Condition) -> Self {
        Self::single(condition)
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for condition in &self.conditions {
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expression;
    use crate::operator::Operator;

    #[test]
    fn test_empty_groups_are_skipped() {
        let w = Where::any([
            Condition::new(),
            Condition::new().with("a", Expression::eq(1).unwrap()),
        ]);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_display_lists_every_group() {
        let w = Where::any([
            Condition::new().with("age", Expression::new(Operator::Gte, 18.into()).unwrap()),
            Condition::new().with("age", Expression::new(Operator::Lt, 5.into()).unwrap()),
        ]);
        assert_eq!(w.to_string(), "[{age:[{$gte:18}]}][{age:[{$lt:5}]}]");
    }
}
