//! # tilestore Configuration Module
//!
//! This module centralizes configuration for the storage core: the numeric
//! defaults in [`constants`] and the per-table [`TableConfig`] that a
//! [`crate::storage::TableBuilder`] consumes.
//!
//! ## Why Per-Table Configuration?
//!
//! Allocation counters, group registries and index fanout all belong to the
//! table that owns them. There is no process-wide mutable state: two tables
//! in the same process can use different capacities, and dropping a table
//! drops every counter with it.
//!
//! ## Usage
//!
//! ```ignore
//! use tilestore::config::TableConfig;
//!
//! let config = TableConfig::default()
//!     .tile_group_capacity(64)
//!     .index_fanout(16)
//!     .max_tile_groups(Some(1024));
//! config.validate()?;
//! ```

pub mod constants;
pub use constants::*;

use eyre::{ensure, Result};

/// Tuning knobs fixed at table creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    tile_group_capacity: usize,
    index_fanout: usize,
    max_tile_groups: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            tile_group_capacity: DEFAULT_TILE_GROUP_CAPACITY,
            index_fanout: DEFAULT_INDEX_FANOUT,
            max_tile_groups: None,
        }
    }
}

impl TableConfig {
    pub fn tile_group_capacity(mut self, capacity: usize) -> Self {
        self.tile_group_capacity = capacity;
        self
    }

    pub fn index_fanout(mut self, fanout: usize) -> Self {
        self.index_fanout = fanout;
        self
    }

    /// Caps how many tile groups the table may ever append. Reaching the cap
    /// surfaces as an allocation error on insert.
    pub fn max_tile_groups(mut self, limit: Option<usize>) -> Self {
        self.max_tile_groups = limit;
        self
    }

    pub fn get_tile_group_capacity(&self) -> usize {
        self.tile_group_capacity
    }

    pub fn get_index_fanout(&self) -> usize {
        self.index_fanout
    }

    pub fn get_max_tile_groups(&self) -> Option<usize> {
        self.max_tile_groups
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tile_group_capacity > 0,
            "tile group capacity must be positive"
        );
        ensure!(
            self.tile_group_capacity <= MAX_TILE_GROUP_CAPACITY,
            "tile group capacity {} exceeds maximum {}",
            self.tile_group_capacity,
            MAX_TILE_GROUP_CAPACITY
        );
        ensure!(
            self.index_fanout >= MIN_INDEX_FANOUT,
            "index fanout {} is below minimum {}",
            self.index_fanout,
            MIN_INDEX_FANOUT
        );
        if let Some(limit) = self.max_tile_groups {
            ensure!(limit > 0, "max_tile_groups must allow at least one group");
            ensure!(
                limit as u64 <= u32::MAX as u64,
                "max_tile_groups {} exceeds the group id space",
                limit
            );
        }
        Ok(())
    }
}
