//! # Ordered Index
//!
//! `Index` binds a [`BTreeIndex`] to its definition: a name, the key column
//! positions in the table schema, and the uniqueness flag. The executor
//! projects a stored row with [`Index::project`] and hands the key and
//! location to [`Index::insert`].

use crate::error::ConstraintError;
use crate::index::tree::{BTreeIndex, DuplicateKey, Postings};
use crate::index::IndexKey;
use crate::storage::Location;
use crate::Row;

pub struct Index {
    name: String,
    key_columns: Vec<usize>,
    key_column_names: Vec<String>,
    unique: bool,
    tree: BTreeIndex,
}

impl Index {
    pub fn new(
        name: impl Into<String>,
        key_columns: Vec<usize>,
        key_column_names: Vec<String>,
        unique: bool,
        fanout: usize,
    ) -> Self {
        Self {
            name: name.into(),
            key_columns,
            key_column_names,
            unique,
            tree: BTreeIndex::new(fanout),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_columns(&self) -> &[usize] {
        &self.key_columns
    }

    pub fn key_column_names(&self) -> &[String] {
        &self.key_column_names
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn project(&self, row: &Row) -> IndexKey {
        IndexKey::project(row, &self.key_columns)
    }

    /// Adds `(key, location)`. A unique index refuses a key that is already
    /// present and stays unchanged.
    pub fn insert(&self, key: IndexKey, location: Location) -> Result<(), ConstraintError> {
        match self.tree.insert(&key, location, self.unique) {
            Ok(_) => Ok(()),
            Err(DuplicateKey) => Err(ConstraintError::UniqueConstraintViolation {
                index: self.name.clone(),
                key,
            }),
        }
    }

    /// Locations of every key in `[low, high]`, ascending by key. Locations
    /// sharing a key come back in insertion order. A prefix `high` includes
    /// all of its extensions. Empty when `low` sorts past `high`.
    pub fn lookup_range(&self, low: &IndexKey, high: &IndexKey) -> Vec<Location> {
        self.tree.range(low, high)
    }

    pub fn lookup_exact(&self, key: &IndexKey) -> Vec<Location> {
        self.tree.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.tree.key_count()
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Snapshot of every key with its postings, in key order.
    pub fn entries(&self) -> Vec<(IndexKey, Postings)> {
        self.tree.entries()
    }
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("key_columns", &self.key_column_names)
            .field("unique", &self.unique)
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key, row};

    fn pkey() -> Index {
        Index::new("t_pkey", vec![0], vec!["id".into()], true, 4)
    }

    #[test]
    fn unique_violation_names_index_and_key() {
        let index = pkey();
        index.insert(key![7], Location::new(0, 0)).unwrap();
        let err = index.insert(key![7], Location::new(0, 1)).unwrap_err();
        assert_eq!(
            err,
            ConstraintError::UniqueConstraintViolation {
                index: "t_pkey".into(),
                key: key![7],
            }
        );
        assert_eq!(index.lookup_exact(&key![7]), vec![Location::new(0, 0)]);
    }

    #[test]
    fn non_unique_collects_postings() {
        let index = Index::new("t_val", vec![1], vec!["val".into()], false, 4);
        for slot in 0..3 {
            index.insert(key!["a"], Location::new(0, slot)).unwrap();
        }
        assert_eq!(index.len(), 3);
        assert_eq!(index.key_count(), 1);
        assert_eq!(index.lookup_exact(&key!["a"]).len(), 3);
    }

    #[test]
    fn project_uses_key_columns() {
        let index = Index::new("t_ab", vec![1, 0], vec!["b".into(), "a".into()], false, 4);
        assert_eq!(index.project(&row![1, 2, 3]), key![2, 1]);
    }
}
