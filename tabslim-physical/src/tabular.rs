//! This module defines tables, ordered collections of columns.

/// Module for defining [Table]
pub mod table;
pub use table::Table;
