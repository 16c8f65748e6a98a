//! This module defines the storage types of columns and the values they hold.

/// Module for defining [CellValue]
pub mod cell_value;
pub use cell_value::CellValue;
/// Module for narrowing and widening floating point values
pub mod float;
/// Module for defining [StorageTypeName]
pub mod storage_type_name;
pub use storage_type_name::{LogicalType, StorageTypeName};
