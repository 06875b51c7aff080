use crate::types::Value;
use eyre::{bail, Result};

/// Candidate or materialized row: one value per schema column.
///
/// A row handed to an insert is owned by the caller; storage copies its
/// values and keeps no link back to it. Rows returned by `Table::read` are
/// fresh copies decoded from the tile group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn set(&mut self, index: usize, value: impl Into<Value>) {
        if index >= self.values.len() {
            self.values.resize(index + 1, Value::Null);
        }
        self.values[index] = value.into();
    }

    pub fn get_int(&self, index: usize) -> Result<i64> {
        match self.get(index) {
            Some(Value::Int(i)) => Ok(*i),
            Some(other) => bail!("expected INT, got {:?}", other),
            None => bail!("column {} out of bounds", index),
        }
    }

    pub fn get_text(&self, index: usize) -> Result<&str> {
        match self.get(index) {
            Some(Value::Text(s)) => Ok(s),
            Some(other) => bail!("expected VARCHAR, got {:?}", other),
            None => bail!("column {} out of bounds", index),
        }
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Value::Null))
    }

    pub fn column_count(&self) -> usize {
        self.values.len()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Builds a [`Row`] from a list of values convertible into [`Value`].
///
/// ```ignore
/// let row = row![1, 5, "x", Value::Null];
/// ```
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        $crate::Row::new(vec![$($crate::types::Value::from($value)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_report_mismatch() {
        let row = Row::new(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(row.get_int(0).unwrap(), 1);
        assert_eq!(row.get_text(1).unwrap(), "x");
        assert!(row.get_int(1).is_err());
        assert!(row.get_int(7).is_err());
    }

    #[test]
    fn set_pads_with_null() {
        let mut row = Row::default();
        row.set(2, 9);
        assert_eq!(row.column_count(), 3);
        assert!(row.is_null(0));
        assert_eq!(row.get_int(2).unwrap(), 9);
    }

    #[test]
    fn display_lists_values() {
        let row = Row::new(vec![Value::Int(1), Value::Null, Value::from("a")]);
        assert_eq!(row.to_string(), "(1, NULL, 'a')");
    }
}
