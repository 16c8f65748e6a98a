//! The complete analysis of one file

use std::{path::PathBuf, time::Instant};

use crate::{
    comparison::{analyze_and_compare, ComparisonReports, MemoryComparison},
    config::PipelineConfig,
    error::Error,
    io::CsvTableReader,
    profiler::{analyze_memory_usage, ColumnMemoryRecord, MemoryProfile},
    subset::build_optimized_subset,
    visualization::render_all,
};

/// Results of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Profile of the first rows of the source
    pub sample_profile: MemoryProfile,
    /// Memory of the whole source before and after optimization
    pub comparison: MemoryComparison,
    /// Per-column memory of the optimized source
    pub optimized_columns: Vec<ColumnMemoryRecord>,
    /// Location of the optimized subset
    pub subset_path: PathBuf,
    /// Number of rows in the optimized subset
    pub subset_rows: usize,
    /// Charts that were written
    pub charts: Vec<PathBuf>,
}

/// Run all stages in order:
/// profile a sample, compare the whole file before and after optimization,
/// build the optimized subset and draw the charts from it.
///
/// Stops at the first failing stage.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary, Error> {
    config.validate()?;
    let source = config.source_path.as_path();
    log::info!("analyzing \"{}\"", source.display());

    let stage = Instant::now();
    let sample = CsvTableReader::new(source).read_head(config.sample_rows)?;
    let sample_profile = analyze_memory_usage(&sample, Some(&config.initial_sample_report()))?;
    drop(sample);
    log::info!("sample profile done in {:?}", stage.elapsed());

    let stage = Instant::now();
    let reports = ComparisonReports::in_dir(&config.report_dir);
    let (comparison, optimized_columns) = analyze_and_compare(source, &reports)?;
    log::info!("comparison done in {:?}", stage.elapsed());

    let stage = Instant::now();
    let subset_path = config.subset_path();
    let subset = build_optimized_subset(
        source,
        &config.columns_to_load,
        config.chunk_size,
        &subset_path,
    )?;
    log::info!("subset done in {:?}", stage.elapsed());

    let charts = if config.render_charts {
        let stage = Instant::now();
        let charts = render_all(&subset, &config.charts, &config.output_dir)?;
        log::info!("charts done in {:?}", stage.elapsed());
        charts
    } else {
        log::info!("skipping charts");
        Vec::new()
    };

    Ok(PipelineSummary {
        sample_profile,
        comparison,
        optimized_columns,
        subset_path,
        subset_rows: subset.row_count(),
        charts,
    })
}
