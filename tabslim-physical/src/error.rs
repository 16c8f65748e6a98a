//! Error-handling module for the crate

use thiserror::Error;

/// Error-Collection for all the possible Errors occurring in this crate
#[derive(Error, Debug)]
pub enum Error {
    /// A column was requested that the table does not contain
    #[error("missing column {0}")]
    MissingColumn(String),
    /// Two columns of the same table share a name
    #[error("duplicate column name {0}")]
    DuplicateColumn(String),
    /// The columns of a table do not have the same length
    #[error("column \"{column}\" has {found} rows, but the table has {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column
        column: String,
        /// Number of rows of the table
        expected: usize,
        /// Number of rows of the column
        found: usize,
    },
    /// A validity bitmap does not cover its column exactly
    #[error("validity bitmap of column \"{column}\" has length {found}, expected {expected}")]
    ValidityLengthMismatch {
        /// Name of the offending column
        column: String,
        /// Number of values of the column
        expected: usize,
        /// Length of the bitmap
        found: usize,
    },
    /// Tables that should be concatenated do not share the same columns
    #[error("cannot concatenate tables with columns {expected:?} and {found:?}")]
    SchemaMismatch {
        /// Column names of the first table
        expected: Vec<String>,
        /// Column names of the diverging table
        found: Vec<String>,
    },
    /// A value could not be interpreted as a date-time
    #[error("value \"{value}\" of column \"{column}\" is not a valid date-time")]
    InvalidDateTime {
        /// Name of the column
        column: String,
        /// Offending value
        value: String,
    },
    /// A column cannot be converted to a date-time column
    #[error("column \"{column}\" of type {storage_type} cannot be converted to date-times")]
    NotDateTimeConvertible {
        /// Name of the column
        column: String,
        /// Storage type of the column
        storage_type: String,
    },
}
