//! Per-column memory accounting of tables

use std::path::Path;

use serde::{Deserialize, Serialize};

use tabslim_physical::{management::bytesized::ByteSized, tabular::Table};

use crate::{error::Error, io::write_json_report};

/// Number of bytes in a megabyte as used in all reports
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Convert a number of bytes into megabytes.
pub fn bytes_to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MEGABYTE
}

/// Memory usage of a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMemoryRecord {
    /// Name of the column
    pub column: String,
    /// Bytes occupied by the column
    pub memory_bytes: u64,
    /// Fraction of the table's total memory taken by this column, between 0 and 1
    pub memory_share: f64,
    /// Name of the column's storage type
    pub dtype: String,
}

/// Memory usage of a whole table, broken down by column
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryProfile {
    /// Bytes occupied by all columns
    pub total_bytes: u64,
    /// One record per column, in table order
    pub columns: Vec<ColumnMemoryRecord>,
}

impl MemoryProfile {
    /// Total size in megabytes
    pub fn total_megabytes(&self) -> f64 {
        bytes_to_megabytes(self.total_bytes)
    }
}

/// Measure the memory usage of every column of the table.
///
/// The shares of all columns add up to 1 unless the table occupies no memory at all,
/// in which case every share is 0.
pub fn profile_table(table: &Table) -> MemoryProfile {
    let sizes: Vec<u64> = table.columns().iter().map(|c| c.size_bytes()).collect();
    let total_bytes: u64 = sizes.iter().sum();

    let columns = table
        .columns()
        .iter()
        .zip(sizes)
        .map(|(column, memory_bytes)| ColumnMemoryRecord {
            column: column.name().to_string(),
            memory_bytes,
            memory_share: if total_bytes == 0 {
                0.0
            } else {
                memory_bytes as f64 / total_bytes as f64
            },
            dtype: column.storage_type().name().to_string(),
        })
        .collect();

    MemoryProfile {
        total_bytes,
        columns,
    }
}

/// Profile the table and, if a path is given, store the per-column records there as JSON.
pub fn analyze_memory_usage(table: &Table, output: Option<&Path>) -> Result<MemoryProfile, Error> {
    let profile = profile_table(table);

    log::info!(
        "table with {} rows and {} columns occupies {:.3} MB",
        table.row_count(),
        table.column_count(),
        profile.total_megabytes()
    );
    for record in &profile.columns {
        log::debug!(
            "column {} ({}): {} bytes, {:.2}%",
            record.column,
            record.dtype,
            record.memory_bytes,
            record.memory_share * 100.0
        );
    }

    if let Some(path) = output {
        write_json_report(&profile.columns, path)?;
    }

    Ok(profile)
}
