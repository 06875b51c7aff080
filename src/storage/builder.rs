//! # Table Builder
//!
//! Assembles a [`Table`] from a catalog-provided [`TableDef`] and a
//! [`TableConfig`]. All definition problems are reported here, once, so the
//! insert path never re-checks them.
//!
//! ## Checks
//!
//! - the config passes [`TableConfig::validate`]
//! - column names are unique and the column list is non-empty
//! - a primary key exists, is unique and names existing columns
//! - secondary indexes are non-unique, non-empty and name existing columns
//! - index names are unique within the table
//! - column-level UNIQUE only appears on primary key columns
//!
//! Primary key columns are made NOT NULL.
//!
//! ## Usage
//!
//! ```ignore
//! let table = TableBuilder::new(def)
//!     .config(TableConfig::default().tile_group_capacity(64))
//!     .build()?;
//! ```

use crate::config::TableConfig;
use crate::index::Index;
use crate::schema::{Constraint, IndexDef, Schema, TableDef};
use crate::storage::Table;
use eyre::{ensure, Result, WrapErr};
use std::sync::Arc;

pub struct TableBuilder {
    def: TableDef,
    config: TableConfig,
}

impl TableBuilder {
    pub fn new(def: TableDef) -> Self {
        Self {
            def,
            config: TableConfig::default(),
        }
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Table> {
        let name = self.def.name().to_string();
        self.config
            .validate()
            .wrap_err_with(|| format!("invalid config for table '{}'", name))?;

        let primary = self
            .def
            .primary_key()
            .ok_or_else(|| eyre::eyre!("table '{}' has no primary key", name))?;
        ensure!(
            primary.is_unique(),
            "primary key '{}' of table '{}' must be unique",
            primary.name(),
            name
        );

        for column in self.def.columns() {
            ensure!(
                !column.has_constraint(&Constraint::Unique)
                    || primary.columns().iter().any(|c| c == column.name()),
                "column '{}' of table '{}' is UNIQUE outside the primary key",
                column.name(),
                name
            );
        }

        let columns = self
            .def
            .columns()
            .iter()
            .map(|column| {
                if primary.columns().iter().any(|c| c == column.name()) {
                    column.clone().with_constraint(Constraint::PrimaryKey)
                } else {
                    column.clone()
                }
            })
            .collect();
        let schema = Arc::new(
            Schema::new(columns).wrap_err_with(|| format!("invalid schema for table '{}'", name))?,
        );

        let fanout = self.config.get_index_fanout();
        let mut indexes = Vec::with_capacity(1 + self.def.indexes().len());
        indexes.push(build_index(&schema, primary, fanout)?);
        for def in self.def.indexes() {
            ensure!(
                !def.is_unique(),
                "secondary index '{}' of table '{}' must be non-unique",
                def.name(),
                name
            );
            ensure!(
                indexes.iter().all(|i: &Index| i.name() != def.name()),
                "duplicate index name '{}' in table '{}'",
                def.name(),
                name
            );
            indexes.push(build_index(&schema, def, fanout)?);
        }

        let table = Table::new(name.clone(), schema, self.config, indexes)
            .wrap_err_with(|| format!("failed to allocate first tile group of table '{}'", name))?;
        tracing::debug!(
            table = %name,
            indexes = table.indexes().len(),
            capacity = self.config.get_tile_group_capacity(),
            "table built"
        );
        Ok(table)
    }
}

fn build_index(schema: &Schema, def: &IndexDef, fanout: usize) -> Result<Index> {
    ensure!(
        !def.columns().is_empty(),
        "index '{}' has no key columns",
        def.name()
    );
    let key_columns = schema
        .resolve(def.columns())
        .wrap_err_with(|| format!("index '{}' references an unknown column", def.name()))?;
    Ok(Index::new(
        def.name(),
        key_columns,
        def.columns().to_vec(),
        def.is_unique(),
        fanout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use crate::types::DataType;

    fn def() -> TableDef {
        TableDef::new(
            "orders",
            vec![
                ColumnDef::new("id", DataType::Int8),
                ColumnDef::new("customer", DataType::Int8),
                ColumnDef::new("note", DataType::Varchar),
            ],
        )
        .with_primary_key(vec!["id"])
        .with_index(IndexDef::new("orders_customer", vec!["customer"], false))
        .with_index(IndexDef::new("orders_customer_id", vec!["customer", "id"], false))
    }

    #[test]
    fn primary_key_first_then_declared_order() {
        let table = TableBuilder::new(def()).build().unwrap();
        let names: Vec<_> = table.indexes().iter().map(|i| i.name()).collect();
        assert_eq!(names, ["orders_pkey", "orders_customer", "orders_customer_id"]);
        assert_eq!(table.secondary_indexes()[1].key_columns(), &[1, 0]);
        assert!(table.primary_index().is_unique());
    }

    #[test]
    fn primary_key_columns_become_not_null() {
        let table = TableBuilder::new(def()).build().unwrap();
        assert!(!table.schema().columns()[0].is_nullable());
        assert!(table.schema().columns()[1].is_nullable());
    }

    #[test]
    fn duplicate_index_names_are_rejected() {
        let def = def().with_index(IndexDef::new("orders_customer", vec!["note"], false));
        let err = TableBuilder::new(def).build().unwrap_err();
        assert!(err.to_string().contains("duplicate index name"));
    }

    #[test]
    fn column_unique_outside_primary_key_is_rejected() {
        let def = TableDef::new(
            "u",
            vec![
                ColumnDef::new("id", DataType::Int8),
                ColumnDef::new("email", DataType::Varchar).with_constraint(Constraint::Unique),
            ],
        )
        .with_primary_key(vec!["id"]);
        assert!(TableBuilder::new(def).build().is_err());
    }
}
