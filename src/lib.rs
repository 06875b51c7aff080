//! # tilestore - Tuple Storage and Indexing Core
//!
//! tilestore is the in-memory storage core of a relational engine: rows are
//! stored column-major in fixed-capacity tile groups, addressed by stable
//! `Location`s, and indexed by concurrent B+trees with uniqueness and
//! inclusive range guarantees. Many threads may insert into the same table
//! at once.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilestore::executor::{insert, Context};
//! use tilestore::schema::{ColumnDef, IndexDef, TableDef};
//! use tilestore::storage::TableBuilder;
//! use tilestore::types::DataType;
//! use tilestore::{key, row};
//!
//! let def = TableDef::new(
//!     "t",
//!     vec![
//!         ColumnDef::new("id", DataType::Int4),
//!         ColumnDef::new("val", DataType::Int4),
//!     ],
//! )
//! .with_primary_key(vec!["id"])
//! .with_index(IndexDef::new("t_id_val", vec!["id", "val"], false));
//! let table = Arc::new(TableBuilder::new(def).build()?);
//!
//! let ctx = Context::new(1);
//! let location = insert(&table, &ctx, row![10, 11])?;
//! assert_eq!(table.primary_index().lookup_exact(&key![10]), vec![location]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   executor: InsertExecutor, Context │
//! ├─────────────────────────────────────┤
//! │   constraints: ConstraintValidator  │
//! ├──────────────────┬──────────────────┤
//! │ storage: Table,  │ index: Index,    │
//! │ TileGroup,       │ BTreeIndex,      │
//! │ Location         │ IndexKey         │
//! ├──────────────────┴──────────────────┤
//! │   schema, types, row, config        │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - A `Location` is never handed out twice and stays valid for the life of
//!   its table
//! - Of N concurrent inserts with equal primary keys, exactly one succeeds
//! - A failed insert leaves no index entry and no visible row
//! - `lookup_range(low, high)` is inclusive on both ends and sees every
//!   insert that completed before it started
//!
//! ## Module Overview
//!
//! - [`config`]: defaults and `TableConfig`
//! - [`types`]: `DataType` and the totally ordered `Value`
//! - [`schema`]: column, index and table definitions
//! - [`storage`]: tile groups, tables, locations
//! - [`index`]: keys and the concurrent B+tree
//! - [`constraints`]: row validation before placement
//! - [`executor`]: the insert state machine
//! - [`error`]: runtime error taxonomy

pub mod config;
pub mod constraints;
pub mod error;
pub mod executor;
pub mod index;
mod row;
pub mod schema;
pub mod storage;
pub mod types;

pub use error::{AllocationError, ConstraintError, InsertError};
pub use index::{Index, IndexKey};
pub use row::Row;
pub use storage::{Location, Table, TableBuilder};
