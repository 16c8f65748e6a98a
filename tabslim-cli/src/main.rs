/*!
  Binary for the CLI of tabslim
*/

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod cli;
pub mod error;

use clap::Parser;
use cli::CliApp;
use colored::Colorize;
use error::CliError;
use tabslim::pipeline::{self, PipelineSummary};

fn print_finished_message(summary: &PipelineSummary) {
    let comparison = &summary.comparison;

    println!(
        "Optimization reduced memory by {}{}.",
        format!("{:.2}", comparison.reduction_percentage).green().bold(),
        "%".green().bold(),
    );
    println!(
        "   {0: <18} {1:>12.3} MB",
        "File size:", comparison.file_size_on_disk_mb
    );
    println!(
        "   {0: <18} {1:>12.3} MB",
        "Initial memory:", comparison.initial_memory_mb
    );
    println!(
        "   {0: <18} {1:>12.3} MB",
        "Optimized memory:", comparison.optimized_memory_mb
    );
    println!(
        "   {0: <18} {1:>12} rows ({2})",
        "Subset:",
        summary.subset_rows,
        summary.subset_path.display()
    );
    println!("   {0: <18} {1:>12}", "Charts:", summary.charts.len());
}

fn run(cli: CliApp) -> Result<PipelineSummary, CliError> {
    let config = cli.pipeline_config()?;
    log::debug!("{config:?}");

    Ok(pipeline::run(&config)?)
}

fn main() {
    let cli = CliApp::parse();

    cli.logging.initialize_logging();
    log::info!("Version: {}", clap::crate_version!());
    log::debug!("Source: {:?}", cli.source);

    match run(cli) {
        Ok(summary) => print_finished_message(&summary),
        Err(err) => {
            log::error!("{} {err}", "error:".red().bold());
            std::process::exit(1)
        }
    }
}
