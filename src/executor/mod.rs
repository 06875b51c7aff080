//! # Executor Module
//!
//! Execution of DML against a [`crate::storage::Table`]. Only insertion is
//! provided: an [`InsertNode`] names the target table, an [`InsertExecutor`]
//! carries one candidate row through validation, placement and index
//! maintenance.
//!
//! ```text
//! Context (txn id) ──┐
//! InsertNode ────────┼──> InsertExecutor::execute() ──> Location
//! Row ───────────────┘                               └─> InsertError
//! ```
//!
//! Executors are cheap and single-use. Many threads may run executors
//! against the same `Arc<Table>` at once; every shared structure they touch
//! synchronizes internally.

mod context;
mod insert;

pub use context::{Context, TxnId};
pub use insert::{insert, InsertExecutor, InsertNode, InsertState};
