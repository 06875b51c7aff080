//! # Schema Metadata
//!
//! This module holds the read-only schema inputs of the storage core. A
//! `TableDef` describes a table the way the external catalog hands it over;
//! `Schema` is the immutable column list a built table keeps for its whole
//! lifetime.
//!
//! ## Name Resolution
//!
//! Index definitions name their key columns. `Schema::resolve` turns those
//! names into column positions once, at table build time, so the insert path
//! projects keys by position only.
//!
//! ## Concurrency
//!
//! `Schema` is shared as `Arc<Schema>` between the table, its tile groups and
//! every executor; it has no interior mutability.

pub mod table;

pub use table::{ColumnDef, Constraint, IndexDef, TableDef};

use eyre::{bail, ensure, Result};

/// Immutable ordered column list attached to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        ensure!(!columns.is_empty(), "schema must have at least one column");
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name() == column.name()) {
                bail!("duplicate column name '{}'", column.name());
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnDef> {
        self.columns.get(idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Maps column names to positions, failing on the first unknown name.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| eyre::eyre!("column '{}' does not exist", name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn resolve_maps_names_to_positions() {
        let schema = Schema::new(vec![
            ColumnDef::new("a", DataType::Int4),
            ColumnDef::new("b", DataType::Int4),
        ])
        .unwrap();
        assert_eq!(
            schema.resolve(&["b".to_string(), "a".to_string()]).unwrap(),
            vec![1, 0]
        );
        assert!(schema.resolve(&["c".to_string()]).is_err());
    }

    #[test]
    fn duplicate_columns_rejected() {
        let err = Schema::new(vec![
            ColumnDef::new("a", DataType::Int4),
            ColumnDef::new("a", DataType::Int8),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'a'"));
    }
}
