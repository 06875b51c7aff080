//! # Table
//!
//! A `Table` owns its tile groups and its indexes. Groups are kept in an
//! append-only registry whose positions are the group ids carried by every
//! `Location`; one of them, the active group, receives new rows.
//!
//! ```text
//! registry: [g0 (full)] [g1 (full)] [g2 (active)]
//!                                        ^
//!                                   active pointer
//! indexes:  [pkey (unique)] [secondary 1] ... [secondary k]
//! ```
//!
//! ## Allocation
//!
//! `insert_row` reserves a slot in the active group with a bounded atomic
//! increment. When the group is exhausted, the thread takes the active
//! pointer's write latch and compares the pointer with the group it found
//! full. Only if they are still the same does it append and install a new
//! group; otherwise another thread already did. Either way it retries, so
//! exactly one successor is created per exhausted group.
//!
//! Latch order is active pointer, then registry. Readers resolving a
//! location take only the registry read latch.
//!
//! ## Row Counts
//!
//! `row_count` is logical: it counts committed rows that were not marked
//! dead. Placed rows, whose insert is still in flight, are not counted.
//! `slot_count` is physical and includes dead slots.

use crate::config::TableConfig;
use crate::constraints::CheckedRow;
use crate::error::AllocationError;
use crate::index::Index;
use crate::schema::Schema;
use crate::storage::{Location, SlotState, TileGroup};
use crate::Row;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct Table {
    name: String,
    schema: Arc<Schema>,
    config: TableConfig,
    groups: RwLock<Vec<Arc<TileGroup>>>,
    active: RwLock<Arc<TileGroup>>,
    indexes: Vec<Index>,
    row_count: AtomicUsize,
}

impl Table {
    /// Creates a table with one empty tile group. `indexes[0]` is the
    /// primary key; the rest are secondaries in declared order.
    pub(crate) fn new(
        name: String,
        schema: Arc<Schema>,
        config: TableConfig,
        indexes: Vec<Index>,
    ) -> Result<Self, AllocationError> {
        let first = Arc::new(TileGroup::new(
            0,
            Arc::clone(&schema),
            config.get_tile_group_capacity(),
        )?);
        Ok(Self {
            name,
            schema,
            config,
            groups: RwLock::new(vec![Arc::clone(&first)]),
            active: RwLock::new(first),
            indexes,
            row_count: AtomicUsize::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Places `row` in the active tile group and returns its location. The
    /// slot is Placed when this returns: `read` resolves it, but `scan` and
    /// `row_count` ignore it until [`Table::commit`]. Indexes are not
    /// touched.
    pub fn insert_row(&self, row: &CheckedRow, txn_id: u64) -> Result<Location, AllocationError> {
        loop {
            let group = Arc::clone(&*self.active.read());
            if let Some(slot) = group.allocate_slot() {
                let location = group.write_row(slot, row.row(), txn_id).map_err(|err| {
                    tracing::debug!(table = %self.name, group = group.id(), slot, %err, "row placement failed");
                    err
                })?;
                return Ok(location);
            }
            self.install_successor(&group)?;
        }
    }

    fn install_successor(&self, exhausted: &Arc<TileGroup>) -> Result<(), AllocationError> {
        let mut active = self.active.write();
        if !Arc::ptr_eq(&active, exhausted) {
            return Ok(());
        }

        let mut groups = self.groups.write();
        let next_id = groups.len();
        if let Some(limit) = self.config.get_max_tile_groups() {
            if next_id >= limit {
                tracing::debug!(table = %self.name, limit, "tile group limit reached");
                return Err(AllocationError::GroupLimitReached {
                    table: self.name.clone(),
                    limit,
                });
            }
        }
        let id = u32::try_from(next_id).map_err(|_| AllocationError::GroupLimitReached {
            table: self.name.clone(),
            limit: next_id,
        })?;

        let group = TileGroup::new(
            id,
            Arc::clone(&self.schema),
            self.config.get_tile_group_capacity(),
        )
        .map_err(|err| {
            tracing::debug!(table = %self.name, group = id, %err, "tile group allocation failed");
            err
        })?;
        let group = Arc::new(group);
        groups.push(Arc::clone(&group));
        *active = group;
        tracing::debug!(table = %self.name, group = id, "tile group installed");
        Ok(())
    }

    /// Reads the row at `location`; `None` unless the slot is Placed or Live.
    pub fn read(&self, location: Location) -> Option<Row> {
        self.tile_group(location.group_id)?.read(location.slot)
    }

    /// Live rows of every group in location order.
    pub fn scan(&self) -> Vec<(Location, Row)> {
        let groups = self.groups.read().clone();
        groups.iter().flat_map(|g| g.live_rows()).collect()
    }

    /// Makes a Placed row visible to `scan` and counts it. Returns false if
    /// the slot was not Placed.
    pub fn commit(&self, location: Location) -> bool {
        let Some(group) = self.tile_group(location.group_id) else {
            return false;
        };
        let committed = group.commit(location.slot);
        if committed {
            self.row_count.fetch_add(1, Ordering::AcqRel);
        }
        committed
    }

    /// Marks a Placed or Live row dead. Returns false if the slot held no
    /// row.
    pub fn mark_dead(&self, location: Location) -> bool {
        let Some(group) = self.tile_group(location.group_id) else {
            return false;
        };
        match group.mark_dead(location.slot) {
            Some(SlotState::Live) => {
                self.row_count.fetch_sub(1, Ordering::AcqRel);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count.load(Ordering::Acquire)
    }

    /// Slots handed out across all groups, dead ones included.
    pub fn slot_count(&self) -> usize {
        self.groups.read().iter().map(|g| g.allocated()).sum()
    }

    pub fn tile_group_count(&self) -> usize {
        self.groups.read().len()
    }

    pub fn tile_group(&self, id: u32) -> Option<Arc<TileGroup>> {
        self.groups.read().get(id as usize).cloned()
    }

    pub fn active_tile_group(&self) -> Arc<TileGroup> {
        Arc::clone(&self.active.read())
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn index(&self, idx: usize) -> Option<&Index> {
        self.indexes.get(idx)
    }

    pub fn primary_index(&self) -> &Index {
        &self.indexes[0]
    }

    pub fn secondary_indexes(&self) -> &[Index] {
        &self.indexes[1..]
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("rows", &self.row_count())
            .field("tile_groups", &self.tile_group_count())
            .field("indexes", &self.indexes)
            .finish()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns: Vec<_> = self
            .schema
            .columns()
            .iter()
            .map(|c| format!("{} {}", c.name(), c.data_type()))
            .collect();
        writeln!(f, "TABLE {} ({})", self.name, columns.join(", "))?;
        for index in &self.indexes {
            writeln!(
                f,
                "  INDEX {} ({}){} entries={}",
                index.name(),
                index.key_column_names().join(", "),
                if index.is_unique() { " UNIQUE" } else { "" },
                index.len()
            )?;
        }
        let groups = self.groups.read().clone();
        for group in &groups {
            writeln!(
                f,
                "  TILE GROUP {} [{}/{} slots, {} live]",
                group.id(),
                group.allocated(),
                group.capacity(),
                group.live_count()
            )?;
            for (location, row) in group.live_rows() {
                writeln!(f, "    {} {}", location, row)?;
            }
        }
        write!(f, "  {} rows", self.row_count())
    }
}
