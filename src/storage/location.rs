//! # Physical Row Addressing
//!
//! A `Location` names a stored row by `(group_id, slot)`. Group ids are
//! positions in the owning table's tile group registry, so a location is
//! resolved through the registry rather than dereferenced as a pointer and
//! stays meaningful for the lifetime of the table.
//!
//! Locations are totally ordered by `(group_id, slot)`. Because groups are
//! appended in creation order and slots are handed out by a monotonic
//! counter, this is also allocation order.

/// Stable physical address of a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub group_id: u32,
    pub slot: u32,
}

impl Location {
    pub fn new(group_id: u32, slot: u32) -> Self {
        Self { group_id, slot }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.slot)
    }
}
