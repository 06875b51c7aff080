//! # Index Keys
//!
//! An `IndexKey` is the projection of a row onto an index's key columns, in
//! declared column order. Keys compare lexicographically, column by column,
//! with each column using `Value`'s total order. A key that is a strict
//! prefix of another sorts before it:
//!
//! ```text
//! (10) < (10, 0) < (10, 11) < (11) < (100) < (100, 101)
//! ```
//!
//! That makes a prefix key a usable low bound on a composite index. As a
//! high bound a prefix covers all of its extensions: a range stops at the
//! first key whose leading columns exceed the bound (see
//! [`IndexKey::exceeds`]), so `lookup_range((10), (100))` over an `(a, b)`
//! index returns every entry with `10 <= a <= 100`.
//!
//! Keys hold up to four columns inline (`SmallVec<[Value; 4]>`) so common
//! single- and two-column keys project without a heap allocation for the
//! column list itself.

use crate::types::Value;
use crate::Row;
use smallvec::SmallVec;

/// Projected, totally ordered index key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct IndexKey(SmallVec<[Value; 4]>);

impl IndexKey {
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self(values.into_iter().collect())
    }

    /// Projects `row` onto `columns`. Positions past the end of the row
    /// project as NULL.
    pub fn project(row: &Row, columns: &[usize]) -> Self {
        Self(
            columns
                .iter()
                .map(|&c| row.get(c).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if this key sorts after `high` on their shared leading columns.
    /// A key that `high` is a prefix of does not exceed it.
    pub fn exceeds(&self, high: &IndexKey) -> bool {
        let n = self.len().min(high.len());
        self.0[..n] > high.0[..n]
    }
}

impl From<Value> for IndexKey {
    fn from(value: Value) -> Self {
        let mut values = SmallVec::new();
        values.push(value);
        Self(values)
    }
}

impl From<i64> for IndexKey {
    fn from(value: i64) -> Self {
        Value::Int(value).into()
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Builds an [`IndexKey`] from values convertible into [`Value`].
#[macro_export]
macro_rules! key {
    ($($value:expr),* $(,)?) => {
        $crate::index::IndexKey::from_values([$($crate::types::Value::from($value)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_sorts_before_extension() {
        let short = key![10];
        let long = key![10, 0];
        let next = key![11];
        assert!(short < long);
        assert!(long < next);
        assert!(key![100] < key![100, 101]);
    }

    #[test]
    fn prefix_high_bound_covers_extensions() {
        assert!(!key![100, 101].exceeds(&key![100]));
        assert!(!key![100].exceeds(&key![100, 101]));
        assert!(key![101, 0].exceeds(&key![100]));
        assert!(key![100, 102].exceeds(&key![100, 101]));
        assert!(!key![99, 500].exceeds(&key![100]));
    }

    #[test]
    fn projection_follows_declared_order() {
        let row = Row::new(vec![Value::Int(1), Value::Int(2), Value::from("c")]);
        assert_eq!(IndexKey::project(&row, &[2, 0]), key!["c", 1]);
        assert_eq!(IndexKey::project(&row, &[5]), key![Value::Null]);
    }

    #[test]
    fn display_is_parenthesized() {
        assert_eq!(key![1, "x"].to_string(), "(1, 'x')");
    }
}
