//! This module collects the column representations of tabslim.

/// Module for defining [CategoricalData]
pub mod categorical;
/// Module for defining [Column]
pub mod column;
/// Module for converting and concatenating columns
pub mod concat;

pub use categorical::{CategoricalData, CategoryCodes};
pub use column::{Column, ColumnData};
