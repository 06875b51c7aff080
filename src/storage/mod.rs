//! # Storage Module
//!
//! This module provides the physical row store: tables made of fixed-capacity,
//! column-oriented tile groups, and the stable addresses that indexes point
//! at.
//!
//! ## Architecture Overview
//!
//! ```text
//! Table ──────────────────────────────────────────────┐
//! │ registry (append-only)                            │
//! │   ┌──────────────┐ ┌──────────────┐ ┌───────────┐ │
//! │   │ TileGroup 0  │ │ TileGroup 1  │ │ TileGroup │ │
//! │   │ col0 col1 .. │ │ col0 col1 .. │ │ 2 active  │ │
//! │   └──────────────┘ └──────────────┘ └───────────┘ │
//! │ indexes: pkey, secondaries                        │
//! └───────────────────────────────────────────────────┘
//!
//! Location { group_id, slot } ── registry[group_id], slot within group
//! ```
//!
//! Rows never move: a `Location` stays valid for the lifetime of the table,
//! and a location is never handed out twice.
//!
//! ## Module Organization
//!
//! - `location`: `Location`, the `(group_id, slot)` row address
//! - `tile_group`: `TileGroup`, column-major slot arena with atomic allocation
//! - `table`: `Table`, group registry, roll-over and reads
//! - `builder`: `TableBuilder`, definition validation and assembly
//!
//! ## Thread Safety
//!
//! `Table` is `Send + Sync` and meant to be shared as `Arc<Table>`. Slot
//! allocation is lock-free; installing a new tile group and appending to the
//! registry take short write latches.

mod builder;
mod location;
mod table;
mod tile_group;

pub use builder::TableBuilder;
pub use location::Location;
pub use table::Table;
pub use tile_group::{SlotState, TileGroup};
