//! # Insert Executor
//!
//! Runs one candidate row through validation, physical placement and index
//! maintenance, failing as a unit.
//!
//! ## State Machine
//!
//! ```text
//! Idle ─> Validating ─> PhysicallyPlaced ─> PrimaryIndexed ─> SecondaryIndexed ─> (commit) Done
//!             │                │
//!             │                └─ unique violation: slot marked dead ─┐
//!             └─ null / type violation, allocation failure ───────────┴─> Failed
//! ```
//!
//! ## Failure Atomicity
//!
//! | Failure            | Table mutated?            | Index mutated? |
//! |--------------------|---------------------------|----------------|
//! | NOT NULL / type    | no                        | no             |
//! | allocation         | no (slot, if any, Dead)   | no             |
//! | primary unique     | slot marked Dead          | no             |
//!
//! The row is written as Placed: index lookups can resolve it through
//! `Table::read`, but `scan` and `row_count` do not see it until every index
//! holds its entry and the executor commits the slot. A rolled-back slot goes
//! from Placed straight to Dead, so a scan never observes it. A Dead slot
//! consumes its location forever but is invisible to `read`, `scan` and
//! `row_count`. Secondary indexes are non-unique, so once the primary entry
//! is in, the rest of the insert cannot fail.
//!
//! An executor runs once. Calling `execute` again after it left `Idle`
//! returns `InsertError::AlreadyExecuted` and touches nothing.

use crate::constraints::ConstraintValidator;
use crate::error::InsertError;
use crate::executor::Context;
use crate::storage::{Location, Table};
use crate::Row;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertState {
    Idle,
    Validating,
    PhysicallyPlaced,
    PrimaryIndexed,
    SecondaryIndexed,
    Done,
    Failed,
}

/// Plan node naming the target table of an insert.
#[derive(Debug, Clone)]
pub struct InsertNode {
    table: Arc<Table>,
}

impl InsertNode {
    pub fn new(table: Arc<Table>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }
}

pub struct InsertExecutor<'a> {
    node: &'a InsertNode,
    context: &'a Context,
    row: Row,
    state: InsertState,
    location: Option<Location>,
}

impl<'a> InsertExecutor<'a> {
    pub fn new(node: &'a InsertNode, context: &'a Context, row: Row) -> Self {
        Self {
            node,
            context,
            row,
            state: InsertState::Idle,
            location: None,
        }
    }

    pub fn state(&self) -> InsertState {
        self.state
    }

    /// Location of the inserted row once the executor is `Done`.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn execute(&mut self) -> Result<Location, InsertError> {
        if self.state != InsertState::Idle {
            return Err(InsertError::AlreadyExecuted);
        }
        self.context.record_attempt();
        match self.run() {
            Ok(location) => {
                self.state = InsertState::Done;
                self.location = Some(location);
                Ok(location)
            }
            Err(err) => {
                self.state = InsertState::Failed;
                self.context.record_failure();
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<Location, InsertError> {
        let table = self.node.table();

        self.state = InsertState::Validating;
        let checked = ConstraintValidator::new(table.schema()).validate_insert(&self.row)?;

        let location = table.insert_row(&checked, self.context.txn_id())?;
        self.state = InsertState::PhysicallyPlaced;

        let primary = table.primary_index();
        if let Err(err) = primary.insert(primary.project(&checked), location) {
            table.mark_dead(location);
            tracing::debug!(
                table = %table.name(),
                %location,
                txn_id = self.context.txn_id(),
                %err,
                "insert rolled back"
            );
            return Err(err.into());
        }
        self.state = InsertState::PrimaryIndexed;

        for index in table.secondary_indexes() {
            index.insert(index.project(&checked), location)?;
        }
        self.state = InsertState::SecondaryIndexed;

        let committed = table.commit(location);
        debug_assert!(committed, "slot {} was not Placed at commit", location);
        Ok(location)
    }
}

/// Inserts one row into `table` with a fresh executor.
pub fn insert(table: &Arc<Table>, context: &Context, row: Row) -> Result<Location, InsertError> {
    let node = InsertNode::new(Arc::clone(table));
    InsertExecutor::new(&node, context, row).execute()
}
