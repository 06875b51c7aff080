//! # Table Definition Module
//!
//! This module provides the schema metadata the storage core consumes as
//! read-only input: columns, their constraints, and index definitions. The
//! catalog that produces these definitions lives outside this crate.
//!
//! ## Overview
//!
//! - **Columns**: typed fields with NOT NULL / PRIMARY KEY / UNIQUE flags
//!   and an optional VARCHAR length limit
//! - **Indexes**: ordered key column lists plus a uniqueness flag
//! - **TableDef**: a named column list with one primary key and any number
//!   of secondary indexes, in declared order
//!
//! ## Table Definition Example
//!
//! ```rust,ignore
//! use tilestore::schema::{ColumnDef, Constraint, IndexDef, TableDef};
//! use tilestore::types::DataType;
//!
//! let table = TableDef::new(
//!     "accounts",
//!     vec![
//!         ColumnDef::new("id", DataType::Int4).with_constraint(Constraint::NotNull),
//!         ColumnDef::new("owner", DataType::Varchar).with_max_length(32),
//!     ],
//! )
//! .with_primary_key(vec!["id"])
//! .with_index(IndexDef::new("idx_owner", vec!["owner", "id"], false));
//! ```
//!
//! ## Immutability
//!
//! Once a table is built its `Schema` is shared behind an `Arc` and never
//! changes. Index key columns are resolved to positions exactly once, at
//! build time.

use crate::types::DataType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    NotNull,
    PrimaryKey,
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    name: String,
    data_type: DataType,
    constraints: Vec<Constraint>,
    max_length: Option<u32>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraints: Vec::new(),
            max_length: None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
        self
    }

    pub fn not_null(self) -> Self {
        self.with_constraint(Constraint::NotNull)
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }

    /// PRIMARY KEY implies NOT NULL.
    pub fn is_nullable(&self) -> bool {
        !self.has_constraint(&Constraint::NotNull) && !self.has_constraint(&Constraint::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.has_constraint(&Constraint::Unique) || self.has_constraint(&Constraint::PrimaryKey)
    }

    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    pub fn is_variable_length(&self) -> bool {
        self.data_type.is_variable()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    name: String,
    columns: Vec<String>,
    is_unique: bool,
}

impl IndexDef {
    pub fn new(name: impl Into<String>, columns: Vec<impl Into<String>>, is_unique: bool) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            is_unique,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    name: String,
    columns: Vec<ColumnDef>,
    primary_key: Option<IndexDef>,
    indexes: Vec<IndexDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_key: None,
            indexes: Vec::new(),
        }
    }

    /// Declares the primary key. The index is named `<table>_pkey`.
    pub fn with_primary_key(mut self, columns: Vec<impl Into<String>>) -> Self {
        let name = format!("{}_pkey", self.name);
        self.primary_key = Some(IndexDef::new(name, columns, true));
        self
    }

    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn primary_key(&self) -> Option<&IndexDef> {
        self.primary_key.as_ref()
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_key_columns_are_not_nullable() {
        let col = ColumnDef::new("id", DataType::Int4).with_constraint(Constraint::PrimaryKey);
        assert!(!col.is_nullable());
        assert!(col.is_unique());
    }

    #[test]
    fn constraints_are_not_duplicated() {
        let col = ColumnDef::new("id", DataType::Int4).not_null().not_null();
        assert_eq!(col.constraints(), &[Constraint::NotNull]);
    }

    #[test]
    fn primary_key_index_is_unique_and_named_after_table() {
        let def = TableDef::new("users", vec![ColumnDef::new("id", DataType::Int8)])
            .with_primary_key(vec!["id"]);
        let pk = def.primary_key().unwrap();
        assert_eq!(pk.name(), "users_pkey");
        assert!(pk.is_unique());
        assert_eq!(pk.columns(), &["id".to_string()]);
    }
}
