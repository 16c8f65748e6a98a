//! Settings of a pipeline run

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, ReadingError};

/// Columns read into the optimized subset if nothing else is configured
pub const DEFAULT_COLUMNS: [&str; 9] = [
    "event_time",
    "event_type",
    "product_id",
    "category_id",
    "category_code",
    "brand",
    "price",
    "user_id",
    "user_session",
];

/// Which columns of the subset each chart is drawn from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartColumns {
    /// Time stamps of the events
    pub time_column: String,
    /// Kind of each event
    pub event_type_column: String,
    /// Column whose most frequent values are shown in the pie chart
    pub category_column: String,
    /// Numeric columns compared in the correlation matrix
    pub correlation_columns: Vec<String>,
    /// Numeric column shown in the histogram
    pub histogram_column: String,
}

impl Default for ChartColumns {
    fn default() -> Self {
        Self {
            time_column: "event_time".to_string(),
            event_type_column: "event_type".to_string(),
            category_column: "brand".to_string(),
            correlation_columns: vec![
                "price".to_string(),
                "category_id".to_string(),
                "product_id".to_string(),
            ],
            histogram_column: "price".to_string(),
        }
    }
}

impl ChartColumns {
    /// All columns used by some chart, without duplicates
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.time_column.as_str(),
            self.event_type_column.as_str(),
            self.category_column.as_str(),
        ];
        columns.extend(self.correlation_columns.iter().map(String::as_str));
        columns.push(self.histogram_column.as_str());

        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        unique
    }
}

/// Settings of a pipeline run
///
/// Every field is optional when read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// The delimited file to analyze
    pub source_path: PathBuf,
    /// Number of rows of the quick initial profile
    pub sample_rows: usize,
    /// Number of rows per batch when building the subset
    pub chunk_size: usize,
    /// Columns kept in the optimized subset
    pub columns_to_load: Vec<String>,
    /// Directory receiving the charts
    pub output_dir: PathBuf,
    /// Directory receiving the reports and the subset
    pub report_dir: PathBuf,
    /// Whether to draw the charts at all
    pub render_charts: bool,
    /// Column roles of the charts
    pub charts: ChartColumns,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("data/2019-Dec.csv"),
            sample_rows: 1000,
            chunk_size: 50000,
            columns_to_load: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            output_dir: PathBuf::from("Graphics"),
            report_dir: PathBuf::from("."),
            render_charts: true,
            charts: ChartColumns::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a configuration from a JSON file.
    ///
    /// Fields missing in the file keep their default values.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|error| ReadingError::IOReading {
            error,
            filename: path.display().to_string(),
        })?;

        let config = serde_json::from_str(&content).map_err(|error| ReadingError::Configuration {
            error,
            filename: path.display().to_string(),
        })?;

        Ok(config)
    }

    /// Check that the settings can be used for a run.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_rows == 0 {
            return Err(Error::InvalidConfiguration(
                "sample_rows must be positive".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfiguration(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.columns_to_load.is_empty() {
            return Err(Error::InvalidConfiguration(
                "columns_to_load must name at least one column".to_string(),
            ));
        }

        if self.render_charts {
            if self.charts.correlation_columns.is_empty() {
                return Err(Error::InvalidConfiguration(
                    "charts.correlation_columns must name at least one column".to_string(),
                ));
            }
            for column in self.charts.required_columns() {
                if !self.columns_to_load.iter().any(|c| c == column) {
                    return Err(Error::InvalidConfiguration(format!(
                        "chart column {column} is not part of columns_to_load"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Profile of the first rows
    pub fn initial_sample_report(&self) -> PathBuf {
        self.report_dir.join("initial_memory_analysis.json")
    }

    /// The optimized subset
    pub fn subset_path(&self) -> PathBuf {
        self.report_dir.join("optimized_subset.csv")
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use assert_fs::{prelude::*, NamedTempFile};
    use test_log::test;

    use super::{ChartColumns, PipelineConfig};
    use crate::error::{Error, ReadingError};

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.sample_rows, 1000);
        assert_eq!(config.chunk_size, 50000);
        assert_eq!(config.columns_to_load.len(), 9);
        assert_eq!(config.output_dir, PathBuf::from("Graphics"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = NamedTempFile::new("config.json").unwrap();
        file.write_str(r#"{ "chunk_size": 10, "charts": { "category_column": "event_type" } }"#)
            .unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.sample_rows, 1000);
        assert_eq!(config.charts.category_column, "event_type");
        assert_eq!(config.charts.histogram_column, "price");
    }

    #[test]
    fn malformed_file() {
        let file = NamedTempFile::new("config.json").unwrap();
        file.write_str("{ chunk_size: ").unwrap();

        assert!(matches!(
            PipelineConfig::from_json_file(file.path()),
            Err(Error::ReadingError(ReadingError::Configuration { .. }))
        ));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let config = PipelineConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn chart_columns_must_be_loaded() {
        let mut config = PipelineConfig {
            columns_to_load: vec!["price".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.render_charts = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn required_columns_are_unique() {
        assert_eq!(
            ChartColumns::default().required_columns(),
            vec!["event_time", "event_type", "brand", "price", "category_id", "product_id"]
        );
    }
}
