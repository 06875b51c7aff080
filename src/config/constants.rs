//! # tilestore Configuration Constants
//!
//! This module centralizes the numeric defaults of the storage and indexing
//! core. Constants that depend on each other are co-located and their
//! relationships are enforced with compile-time assertions.
//!
//! ## Dependency Graph
//!
//! ```text
//! DEFAULT_TILE_GROUP_CAPACITY (1000 slots)
//!       │
//!       └─> MAX_TILE_GROUP_CAPACITY (must be >=)
//!             Slot offsets are stored as u32 inside a Location, so the
//!             capacity of one group can never exceed u32::MAX.
//!
//! DEFAULT_INDEX_FANOUT (64 keys per node)
//!       │
//!       └─> MIN_INDEX_FANOUT (must be >=)
//!             A node split moves half the keys to a new sibling; with fewer
//!             than 3 keys per node an interior split would leave an empty
//!             half and the tree would stop being balanced.
//! ```
//!
//! ## Critical Invariants
//!
//! 1. `MIN_INDEX_FANOUT <= DEFAULT_INDEX_FANOUT`
//! 2. `DEFAULT_TILE_GROUP_CAPACITY <= MAX_TILE_GROUP_CAPACITY`
//! 3. `MAX_TILE_GROUP_CAPACITY <= u32::MAX`
//!
//! ## Performance Implications
//!
//! - `DEFAULT_TILE_GROUP_CAPACITY`: Larger = fewer group roll-overs (each one
//!   takes the active-group write latch), more memory reserved up front
//! - `DEFAULT_INDEX_FANOUT`: Larger = shallower trees, longer leaf latch hold
//!   times during insert

// ============================================================================
// TILE GROUP CONFIGURATION
// ============================================================================

/// Number of row slots in a freshly appended tile group.
pub const DEFAULT_TILE_GROUP_CAPACITY: usize = 1000;

/// Upper bound for a single tile group's slot capacity.
pub const MAX_TILE_GROUP_CAPACITY: usize = 1 << 24;

/// Width of the null marker stored in front of every cell.
pub const CELL_NULL_MARKER_SIZE: usize = 1;

const _: () = assert!(
    DEFAULT_TILE_GROUP_CAPACITY <= MAX_TILE_GROUP_CAPACITY,
    "DEFAULT_TILE_GROUP_CAPACITY must not exceed MAX_TILE_GROUP_CAPACITY"
);

const _: () = assert!(
    MAX_TILE_GROUP_CAPACITY as u64 <= u32::MAX as u64,
    "slot offsets are stored as u32"
);

// ============================================================================
// INDEX CONFIGURATION
// ============================================================================

/// Maximum number of distinct keys held by one B+tree node.
pub const DEFAULT_INDEX_FANOUT: usize = 64;

/// Smallest fanout that still splits into two non-empty halves.
pub const MIN_INDEX_FANOUT: usize = 3;

const _: () = assert!(
    MIN_INDEX_FANOUT <= DEFAULT_INDEX_FANOUT,
    "DEFAULT_INDEX_FANOUT must be >= MIN_INDEX_FANOUT"
);

// ============================================================================
// TRANSACTION TOKENS
// ============================================================================

/// Transaction id recorded for rows placed without an executor context.
pub const INVALID_TXN_ID: u64 = 0;
