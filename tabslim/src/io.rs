//! Reading and writing of tables and reports.

pub mod csv_reader;
pub mod csv_writer;
pub mod json_report;

mod atomic;

pub use csv_reader::{CsvTableReader, TableBatches};
pub use csv_writer::write_table;
pub use json_report::write_json_report;

/// Number of rows after which progress is logged
const PROGRESS_NOTIFY_INCREMENT: u64 = 1_000_000;
