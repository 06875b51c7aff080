//! # Owned Value Representation
//!
//! This module provides `Value`, the fully-owned column value handed to the
//! storage core by callers and handed back by `Table::read`.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type | Column Types |
//! |---------|-----------|--------------|
//! | Null | - | any nullable column |
//! | Bool | bool | BOOL |
//! | Int | i64 | SMALLINT, INT, BIGINT (range-checked per column) |
//! | Float | f64 | DOUBLE |
//! | Text | String | VARCHAR |
//!
//! ## Total Order
//!
//! Index keys need a total order, so `Value` implements `Ord` directly rather
//! than SQL three-valued comparison:
//!
//! - NULL sorts before every non-NULL value and equals itself
//! - Floats use IEEE-754 `total_cmp` (`-0.0 < +0.0`, NaN sorts last)
//! - Values of different variants order by variant rank:
//!   Null < Bool < Int < Float < Text
//!
//! Equality is defined through the same order, so `Float(NaN) == Float(NaN)`
//! and `Eq`/`Ord` stay consistent for use as B+tree keys.
//!
//! ## Cell Encoding
//!
//! Fixed-width values are written little-endian into a tile group cell of
//! exactly `DataType::cell_size()` bytes. Text is never encoded here; the
//! tile group stores it in its side heap and writes a reference instead.

use super::DataType;
use std::cmp::Ordering;

/// Fully-owned column value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Text(_) => 4,
        }
    }

    /// Short name of the variant, used in type violation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int(_) => "INT",
            Value::Float(_) => "DOUBLE",
            Value::Text(_) => "TEXT",
        }
    }

    /// Returns true if this non-NULL value can be stored in a column of
    /// `data_type`. Integers must fit the column width; text must fit
    /// `max_length` characters when one is declared.
    pub fn conforms_to(&self, data_type: DataType, max_length: Option<u32>) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Bool(_), DataType::Bool) => true,
            (Value::Int(i), DataType::Int2) => i16::try_from(*i).is_ok(),
            (Value::Int(i), DataType::Int4) => i32::try_from(*i).is_ok(),
            (Value::Int(_), DataType::Int8) => true,
            (Value::Float(_), DataType::Float8) => true,
            (Value::Text(s), DataType::Varchar) => match max_length {
                Some(max) => s.chars().count() <= max as usize,
                None => true,
            },
            _ => false,
        }
    }

    /// Writes a fixed-width value into `out`, which must be exactly
    /// `data_type.cell_size()` bytes. Returns false for NULL, text, or a
    /// value that does not conform to `data_type`.
    pub fn encode_fixed(&self, data_type: DataType, out: &mut [u8]) -> bool {
        debug_assert_eq!(out.len(), data_type.cell_size());
        match (self, data_type) {
            (Value::Bool(b), DataType::Bool) => out[0] = *b as u8,
            (Value::Int(i), DataType::Int2) => match i16::try_from(*i) {
                Ok(v) => out.copy_from_slice(&v.to_le_bytes()),
                Err(_) => return false,
            },
            (Value::Int(i), DataType::Int4) => match i32::try_from(*i) {
                Ok(v) => out.copy_from_slice(&v.to_le_bytes()),
                Err(_) => return false,
            },
            (Value::Int(i), DataType::Int8) => out.copy_from_slice(&i.to_le_bytes()),
            (Value::Float(f), DataType::Float8) => out.copy_from_slice(&f.to_le_bytes()),
            _ => return false,
        }
        true
    }

    /// Inverse of [`Value::encode_fixed`]. Returns `None` for variable-length
    /// types or a cell of the wrong width.
    pub fn decode_fixed(data_type: DataType, bytes: &[u8]) -> Option<Value> {
        if bytes.len() != data_type.cell_size() {
            return None;
        }
        let value = match data_type {
            DataType::Bool => Value::Bool(bytes[0] != 0),
            DataType::Int2 => Value::Int(i16::from_le_bytes(bytes.try_into().ok()?) as i64),
            DataType::Int4 => Value::Int(i32::from_le_bytes(bytes.try_into().ok()?) as i64),
            DataType::Int8 => Value::Int(i64::from_le_bytes(bytes.try_into().ok()?)),
            DataType::Float8 => Value::Float(f64::from_le_bytes(bytes.try_into().ok()?)),
            DataType::Varchar => return None,
        };
        Some(value)
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
