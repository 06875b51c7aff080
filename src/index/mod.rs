//! # Index Module
//!
//! Ordered secondary structures mapping key values to row locations.
//!
//! ```text
//! Table
//!   ├── indexes[0]  primary key, unique
//!   ├── indexes[1]  secondary, non-unique
//!   └── ...
//!
//! Index ── name, key columns, unique flag
//!   └── BTreeIndex ── IndexKey -> [Location, ...]
//! ```
//!
//! ## Components
//!
//! - [`IndexKey`]: projection of a row onto key columns, lexicographically
//!   ordered
//! - [`BTreeIndex`]: concurrent B+tree with per-node latches
//! - [`Index`]: definition plus uniqueness enforcement
//!
//! An index only ever grows. Entries are added after the row they point to
//! is Placed, and a failed primary insert adds nothing, so every location in
//! an index resolves to a readable row.

mod key;
mod ordered_index;
mod tree;

pub use key::IndexKey;
pub use ordered_index::Index;
pub use tree::{BTreeIndex, DuplicateKey, InsertResult, Postings};
