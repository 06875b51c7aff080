//! # Value and Type System
//!
//! This module provides the value/type layer the storage core consumes: the
//! column `DataType` discriminant and the owned, totally ordered `Value`.
//!
//! ## Module Structure
//!
//! - `data_type`: `DataType` enum and per-type cell widths
//! - `value`: `Value` with total order and fixed-width cell encoding
//!
//! ## Usage
//!
//! ```ignore
//! use tilestore::types::{DataType, Value};
//!
//! let v = Value::Int(42);
//! assert!(v.conforms_to(DataType::Int4, None));
//! ```

mod data_type;
mod value;

pub use data_type::{DataType, VARLEN_REF_SIZE};
pub use value::Value;
