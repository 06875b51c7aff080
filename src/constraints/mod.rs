//! # Constraint Enforcement Module
//!
//! This module validates a candidate row against its table schema before the
//! insert path touches storage. Everything checked here is a property of the
//! row alone; uniqueness needs the index and is enforced by
//! `Index::insert` under the leaf latch instead.
//!
//! ## Supported Constraints
//!
//! | Constraint   | Checked here | Error                        |
//! |--------------|--------------|------------------------------|
//! | arity        | ✓            | `TypeViolation`              |
//! | NOT NULL     | ✓            | `NullConstraintViolation`    |
//! | PRIMARY KEY  | not-null part| `NullConstraintViolation`    |
//! | column type  | ✓            | `TypeViolation`              |
//! | VARCHAR(n)   | ✓            | `TypeViolation`              |
//! | UNIQUE       | -            | `UniqueConstraintViolation`  |
//!
//! ## Validation Order
//!
//! 1. Pad missing trailing columns with NULL
//! 2. Reject surplus values
//! 3. Validate NOT NULL column by column
//! 4. Validate type and length column by column
//!
//! The first failing column is reported. A successful validation yields a
//! [`CheckedRow`], the only row type `Table::insert_row` accepts, so storage
//! never sees a row that skipped these checks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let validator = ConstraintValidator::new(table.schema());
//! let checked = validator.validate_insert(&row)?;
//! let location = table.insert_row(&checked, txn_id)?;
//! ```

use crate::error::InsertError;
use crate::schema::Schema;
use crate::types::{DataType, Value};
use crate::Row;

/// A row that passed [`ConstraintValidator::validate_insert`] and has exactly
/// one value per schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedRow(Row);

impl CheckedRow {
    pub fn row(&self) -> &Row {
        &self.0
    }
}

impl std::ops::Deref for CheckedRow {
    type Target = Row;

    fn deref(&self) -> &Row {
        &self.0
    }
}

pub struct ConstraintValidator<'a> {
    schema: &'a Schema,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn validate_insert(&self, row: &Row) -> Result<CheckedRow, InsertError> {
        let mut values = row.values.clone();
        self.apply_defaults(&mut values)?;
        self.validate_not_null(&values)?;
        self.validate_types(&values)?;
        Ok(CheckedRow(Row::new(values)))
    }

    pub fn apply_defaults(&self, values: &mut Vec<Value>) -> Result<(), InsertError> {
        let arity = self.schema.len();
        if values.len() > arity {
            return Err(InsertError::TypeViolation {
                column: format!("#{}", arity),
                expected: format!("at most {} values", arity),
                found: format!("{} values", values.len()),
            });
        }
        values.resize(arity, Value::Null);
        Ok(())
    }

    pub fn validate_not_null(&self, values: &[Value]) -> Result<(), InsertError> {
        for (column, value) in self.schema.columns().iter().zip(values) {
            if value.is_null() && !column.is_nullable() {
                return Err(InsertError::NullConstraintViolation {
                    column: column.name().to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn validate_types(&self, values: &[Value]) -> Result<(), InsertError> {
        for (column, value) in self.schema.columns().iter().zip(values) {
            if !value.conforms_to(column.data_type(), column.max_length()) {
                return Err(InsertError::TypeViolation {
                    column: column.name().to_string(),
                    expected: expected_type(column.data_type(), column.max_length()),
                    found: describe(value),
                });
            }
        }
        Ok(())
    }
}

fn expected_type(data_type: DataType, max_length: Option<u32>) -> String {
    match (data_type, max_length) {
        (DataType::Varchar, Some(max)) => format!("{}({})", data_type.name(), max),
        _ => data_type.name().to_string(),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("{} of length {}", value.kind(), s.chars().count()),
        Value::Int(i) => format!("{} {}", value.kind(), i),
        _ => value.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;
    use crate::schema::{ColumnDef, Constraint};

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("id", DataType::Int4).with_constraint(Constraint::PrimaryKey),
            ColumnDef::new("val", DataType::Int4),
            ColumnDef::new("name", DataType::Varchar).with_max_length(4),
        ])
        .unwrap()
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let schema = schema();
        let checked = ConstraintValidator::new(&schema)
            .validate_insert(&row![1])
            .unwrap();
        assert_eq!(checked.column_count(), 3);
        assert!(checked.is_null(1));
        assert!(checked.is_null(2));
    }

    #[test]
    fn surplus_values_are_a_type_violation() {
        let schema = schema();
        let err = ConstraintValidator::new(&schema)
            .validate_insert(&row![1, 2, "a", 4])
            .unwrap_err();
        assert!(matches!(err, InsertError::TypeViolation { .. }));
    }

    #[test]
    fn primary_key_column_rejects_null() {
        let schema = schema();
        let err = ConstraintValidator::new(&schema)
            .validate_insert(&row![Value::Null, 2])
            .unwrap_err();
        assert_eq!(
            err,
            InsertError::NullConstraintViolation {
                column: "id".into()
            }
        );
    }

    #[test]
    fn type_and_length_are_checked() {
        let schema = schema();
        let validator = ConstraintValidator::new(&schema);

        let err = validator.validate_insert(&row![1, "x"]).unwrap_err();
        assert!(
            matches!(err, InsertError::TypeViolation { ref column, .. } if column == "val")
        );

        let err = validator.validate_insert(&row![1, 2, "hello"]).unwrap_err();
        match err {
            InsertError::TypeViolation {
                column, expected, ..
            } => {
                assert_eq!(column, "name");
                assert_eq!(expected, "VARCHAR(4)");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = validator
            .validate_insert(&row![i64::from(i32::MAX) + 1, 2])
            .unwrap_err();
        assert!(matches!(err, InsertError::TypeViolation { ref column, .. } if column == "id"));
    }
}
