//! # Error Taxonomy
//!
//! Runtime failures of the storage core are closed enums so callers branch
//! on the variant instead of matching message text. Construction-time
//! problems (bad schema, bad config) are reported through `eyre` instead;
//! they are programming errors, not conditions a caller retries.
//!
//! ```text
//! InsertError
//! ├── NullConstraintViolation   validation, before any mutation
//! ├── TypeViolation             validation, before any mutation
//! ├── UniqueConstraintViolation primary index; slot already marked dead
//! ├── Allocation                storage exhausted; table stays usable
//! └── AlreadyExecuted           executor reused after leaving Idle
//! ```
//!
//! Every variant is recoverable at the table level: a failed insert leaves no
//! reachable index entry and does not change the table's logical row count.

use crate::index::IndexKey;
use thiserror::Error;

/// Storage could not provide a slot for a new row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("table '{table}' reached its limit of {limit} tile groups")]
    GroupLimitReached { table: String, limit: usize },

    #[error("out of memory reserving {bytes} bytes for a tile group")]
    OutOfMemory { bytes: usize },

    #[error("variable-length heap of tile group {group_id} is full")]
    HeapExhausted { group_id: u32 },
}

/// An index refused an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("UNIQUE constraint violated on index '{index}': key {key} already exists")]
    UniqueConstraintViolation { index: String, key: IndexKey },
}

/// Failure of a single insert, reported synchronously by `execute()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    #[error("NOT NULL constraint violated on column '{column}'")]
    NullConstraintViolation { column: String },

    #[error("type violation on column '{column}': expected {expected}, found {found}")]
    TypeViolation {
        column: String,
        expected: String,
        found: String,
    },

    #[error("UNIQUE constraint violated on index '{index}': key {key} already exists")]
    UniqueConstraintViolation { index: String, key: IndexKey },

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("insert executor has already been executed")]
    AlreadyExecuted,
}

impl From<ConstraintError> for InsertError {
    fn from(err: ConstraintError) -> Self {
        match err {
            ConstraintError::UniqueConstraintViolation { index, key } => {
                InsertError::UniqueConstraintViolation { index, key }
            }
        }
    }
}

impl InsertError {
    /// True for the schema-declared invariant failures (nullability, type,
    /// uniqueness), which a caller may retry with a corrected row.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            InsertError::NullConstraintViolation { .. }
                | InsertError::TypeViolation { .. }
                | InsertError::UniqueConstraintViolation { .. }
        )
    }
}
