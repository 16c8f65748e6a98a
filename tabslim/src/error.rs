//! Error-handling module for the crate

use thiserror::Error;

/// Error-Collection for errors related to reading input files.
#[allow(variant_size_differences)]
#[derive(Error, Debug)]
pub enum ReadingError {
    /// Errors on reading a file
    #[error("Failed to read \"{filename}\": {error}.")]
    IOReading {
        /// Contains the wrapped error
        error: std::io::Error,
        /// Filename which caused the error
        filename: String,
    },
    /// The csv parser rejected the input
    #[error("Failed to parse \"{filename}\": {error}")]
    Csv {
        /// Contains the wrapped error
        error: csv::Error,
        /// Filename which caused the error
        filename: String,
    },
    /// Could not read the csv headers
    #[error("cannot read headers in csv file \"{0}\"")]
    MissingHeaders(String),
    /// Missing column in csv file
    #[error("missing column {column} in csv file \"{filename}\"")]
    MissingColumn {
        /// Name of the requested column
        column: String,
        /// Filename which lacks the column
        filename: String,
    },
    /// A configuration file could not be parsed
    #[error("Failed to parse configuration \"{filename}\": {error}")]
    Configuration {
        /// Contains the wrapped error
        error: serde_json::Error,
        /// Filename which caused the error
        filename: String,
    },
}

/// Error-Collection for all the possible Errors occurring in this crate
#[derive(Error, Debug)]
pub enum Error {
    /// Error that happened while reading an input
    #[error(transparent)]
    ReadingError(#[from] ReadingError),
    /// An output file could not be written
    #[error("Failed to write \"{filename}\": {error}")]
    WriteFailure {
        /// Contains the wrapped error
        error: std::io::Error,
        /// Filename which caused the error
        filename: String,
    },
    /// A report could not be serialized
    #[error("Failed to serialize \"{filename}\": {error}")]
    Serialization {
        /// Contains the wrapped error
        error: serde_json::Error,
        /// Filename which caused the error
        filename: String,
    },
    /// A table could not be written as csv
    #[error("Failed to write csv \"{filename}\": {error}")]
    CsvWriting {
        /// Contains the wrapped error
        error: csv::Error,
        /// Filename which caused the error
        filename: String,
    },
    /// A chart could not be drawn
    #[error("Failed to render chart \"{chart}\": {message}")]
    Rendering {
        /// File of the chart
        chart: String,
        /// Description of the failure
        message: String,
    },
    /// The given settings cannot be used
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Error originating from the table layer
    #[error(transparent)]
    Physical(#[from] tabslim_physical::error::Error),
}
