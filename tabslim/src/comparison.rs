//! Comparison of a table's memory usage before and after optimization

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tabslim_physical::optimizer::optimize_all;

use crate::{
    error::{Error, ReadingError},
    io::{write_json_report, CsvTableReader},
    profiler::{bytes_to_megabytes, profile_table, ColumnMemoryRecord},
};

/// Summary of an optimization run over a whole file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryComparison {
    /// Size of the source file in megabytes
    #[serde(rename = "file_size_on_disk_MB")]
    pub file_size_on_disk_mb: f64,
    /// Memory of the table as read, in megabytes
    #[serde(rename = "initial_memory_MB")]
    pub initial_memory_mb: f64,
    /// Memory of the optimized table, in megabytes
    #[serde(rename = "optimized_memory_MB")]
    pub optimized_memory_mb: f64,
    /// Saved memory relative to the initial memory, in percent
    pub reduction_percentage: f64,
}

impl MemoryComparison {
    /// Build a comparison from byte counts.
    pub fn new(file_size_bytes: u64, initial_bytes: u64, optimized_bytes: u64) -> Self {
        Self {
            file_size_on_disk_mb: bytes_to_megabytes(file_size_bytes),
            initial_memory_mb: bytes_to_megabytes(initial_bytes),
            optimized_memory_mb: bytes_to_megabytes(optimized_bytes),
            reduction_percentage: reduction_percentage(
                initial_bytes as f64,
                optimized_bytes as f64,
            ),
        }
    }
}

/// Percentage of `initial` saved by going down to `optimized`.
///
/// Returns 0 if `initial` is 0.
pub fn reduction_percentage(initial: f64, optimized: f64) -> f64 {
    if initial == 0.0 {
        return 0.0;
    }

    (1.0 - optimized / initial) * 100.0
}

/// Locations of the reports written by [analyze_and_compare]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReports {
    /// Per-column memory of the table as read
    pub full_initial: PathBuf,
    /// Per-column memory of the optimized table
    pub optimized: PathBuf,
    /// The [MemoryComparison]
    pub comparison: PathBuf,
}

impl ComparisonReports {
    /// Use the default file names inside the given directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            full_initial: dir.join("full_data_initial_memory.json"),
            optimized: dir.join("optimized_memory_analysis.json"),
            comparison: dir.join("memory_comparison.json"),
        }
    }
}

/// Read the whole file, optimize it and compare its memory usage before and after.
///
/// Nothing is written unless every number could be computed.
/// Returns the comparison together with the per-column records of the optimized table.
pub fn analyze_and_compare(
    source: &Path,
    reports: &ComparisonReports,
) -> Result<(MemoryComparison, Vec<ColumnMemoryRecord>), Error> {
    let file_size = std::fs::metadata(source)
        .map_err(|error| ReadingError::IOReading {
            error,
            filename: source.display().to_string(),
        })?
        .len();

    let table = CsvTableReader::new(source).read_all()?;
    let initial = profile_table(&table);
    log::info!(
        "full table: {} rows, {:.3} MB",
        table.row_count(),
        initial.total_megabytes()
    );

    let optimized_table = optimize_all(table);
    let optimized = profile_table(&optimized_table);
    log::info!("optimized table: {:.3} MB", optimized.total_megabytes());

    let comparison = MemoryComparison::new(file_size, initial.total_bytes, optimized.total_bytes);
    log::info!(
        "memory reduced by {:.2}%",
        comparison.reduction_percentage
    );

    write_json_report(&initial.columns, &reports.full_initial)?;
    write_json_report(&optimized.columns, &reports.optimized)?;
    write_json_report(&comparison, &reports.comparison)?;

    Ok((comparison, optimized.columns))
}
