//! # Column Data Types
//!
//! This module provides the `DataType` enum consumed from the schema layer.
//! Every type has a fixed in-cell width inside a tile group; variable-length
//! types store a fixed-width reference in the cell and their bytes in the
//! owning group's side heap.
//!
//! ## Type Categories
//!
//! | Category | Types | Cell Size |
//! |----------|-------|-----------|
//! | **Boolean** | Bool | 1 byte |
//! | **Integer** | Int2, Int4, Int8 | 2, 4, 8 bytes |
//! | **Float** | Float8 | 8 bytes |
//! | **Text** | Varchar | 8 bytes (heap handle + length) |
//!
//! ## Storage Encoding
//!
//! `#[repr(u8)]` keeps the discriminant to a single byte. Length metadata
//! (VARCHAR maximum) lives on the column definition, not the enum.

/// Storage-level type discriminant for a column.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool = 0,
    Int2 = 1,
    Int4 = 2,
    Int8 = 3,
    Float8 = 5,

    Varchar = 24,
}

/// Width of the indirect reference stored in a variable-length cell:
/// a u32 heap handle followed by a u32 byte length.
pub const VARLEN_REF_SIZE: usize = 8;

impl DataType {
    /// Bytes occupied by one cell of this type, excluding the null marker.
    pub fn cell_size(&self) -> usize {
        match self {
            DataType::Bool => 1,
            DataType::Int2 => 2,
            DataType::Int4 => 4,
            DataType::Int8 => 8,
            DataType::Float8 => 8,
            DataType::Varchar => VARLEN_REF_SIZE,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, DataType::Varchar)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int2 | DataType::Int4 | DataType::Int8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "BOOL",
            DataType::Int2 => "SMALLINT",
            DataType::Int4 => "INT",
            DataType::Int8 => "BIGINT",
            DataType::Float8 => "DOUBLE",
            DataType::Varchar => "VARCHAR",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
