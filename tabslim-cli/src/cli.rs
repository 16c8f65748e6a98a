//! Contains structures and functionality for the binary
use std::path::PathBuf;

use tabslim::config::PipelineConfig;

use crate::error::CliError;

/// Environment variable holding the log filter
const LOG_ENVIRONMENT_VARIABLE: &str = "TABSLIM_LOG";

/// Cli Arguments related to logging
#[derive(clap::Args, Debug)]
pub(crate) struct LoggingArgs {
    /// Increase log verbosity (multiple uses increase verbosity further)
    #[arg(short, long, action = clap::builder::ArgAction::Count, group = "verbosity")]
    verbose: u8,
    /// Reduce log verbosity to show only errors (equivalent to --log error)
    #[arg(short, long, group = "verbosity")]
    quiet: bool,
    /// Set log verbosity (default is "warn")
    #[arg(long = "log", value_parser=clap::builder::PossibleValuesParser::new(["error", "warn", "info", "debug", "trace"]), group = "verbosity")]
    log_level: Option<String>,
}

impl LoggingArgs {
    /// Initialising Logging
    ///
    /// Sets the logging verbosity to the given log-level in the following order:
    ///  * `Info`, `Debug`, `Trace`; depending on the count of `-v`
    ///  * `Error` when `-q` is used
    ///  * The `TABSLIM_LOG` environment variable value
    ///  * `Warn` otherwise
    pub(crate) fn initialize_logging(&self) {
        let mut builder = env_logger::Builder::new();

        builder.filter_level(log::LevelFilter::Warn);

        builder.parse_env(LOG_ENVIRONMENT_VARIABLE);
        if let Some(ref level) = self.log_level {
            builder.parse_filters(level);
        } else if self.quiet {
            builder.filter_level(log::LevelFilter::Error);
        } else if self.verbose > 0 {
            builder.filter_level(match self.verbose {
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            });
        }
        builder.init();
    }
}

/// Cli arguments overriding the pipeline settings
#[derive(Debug, clap::Args)]
pub(crate) struct PipelineArgs {
    /// JSON file with pipeline settings; the other arguments take precedence
    #[arg(short, long = "config")]
    pub(crate) config: Option<PathBuf>,
    /// Number of rows of the initial memory profile
    #[arg(long = "sample-rows")]
    pub(crate) sample_rows: Option<usize>,
    /// Number of rows per batch when building the optimized subset
    #[arg(long = "chunk-size")]
    pub(crate) chunk_size: Option<usize>,
    /// Columns kept in the optimized subset
    #[arg(long = "columns", value_delimiter = ',')]
    pub(crate) columns: Option<Vec<String>>,
    /// Directory for the charts
    #[arg(short = 'o', long = "output-dir")]
    pub(crate) output_dir: Option<PathBuf>,
    /// Directory for the reports and the optimized subset
    #[arg(short = 'D', long = "report-dir")]
    pub(crate) report_dir: Option<PathBuf>,
    /// Do not draw any charts
    #[arg(long = "no-charts")]
    pub(crate) no_charts: bool,
}

impl PipelineArgs {
    /// Apply the given arguments on top of `config`.
    pub(crate) fn apply(&self, mut config: PipelineConfig) -> Result<PipelineConfig, CliError> {
        if let Some(sample_rows) = self.sample_rows {
            config.sample_rows = sample_rows;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(columns) = &self.columns {
            let columns: Vec<String> = columns.iter().map(|c| c.trim().to_string()).collect();
            if columns.iter().any(String::is_empty) {
                return Err(CliError::InvalidArgument {
                    argument: "--columns".to_string(),
                    reason: "column names must not be empty".to_string(),
                });
            }
            config.columns_to_load = columns;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(report_dir) = &self.report_dir {
            config.report_dir = report_dir.clone();
        }
        if self.no_charts {
            config.render_charts = false;
        }

        Ok(config)
    }
}

/// tabslim CLI
#[derive(clap::Parser, Debug)]
#[command(author, version, about)]
pub struct CliApp {
    /// Delimited file to analyze (overrides the configured source)
    #[arg(value_parser)]
    pub(crate) source: Option<PathBuf>,
    /// Arguments related to the pipeline
    #[command(flatten)]
    pub(crate) pipeline: PipelineArgs,
    /// Arguments related to logging
    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}

impl CliApp {
    /// Combine the configuration file, if any, with the command line arguments.
    pub(crate) fn pipeline_config(&self) -> Result<PipelineConfig, CliError> {
        let config = match &self.pipeline.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        let mut config = self.pipeline.apply(config)?;
        if let Some(source) = &self.source {
            config.source_path = source.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use clap::Parser;

    use super::CliApp;
    use crate::error::CliError;

    #[test]
    fn arguments_override_defaults() {
        let cli = CliApp::parse_from([
            "tabslim",
            "events.csv",
            "--chunk-size",
            "100",
            "--columns",
            "price, brand",
            "--no-charts",
        ]);
        let config = cli.pipeline_config().unwrap();

        assert_eq!(config.source_path, PathBuf::from("events.csv"));
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.sample_rows, 1000);
        assert_eq!(config.columns_to_load, vec!["price", "brand"]);
        assert!(!config.render_charts);
    }

    #[test]
    fn empty_column_name() {
        let cli = CliApp::parse_from(["tabslim", "--columns", "price,,brand"]);
        assert!(matches!(
            cli.pipeline_config(),
            Err(CliError::InvalidArgument { .. })
        ));
    }
}
