//! Building an optimized subset of a large file batch by batch

use std::path::Path;

use tabslim_physical::{management::bytesized::ByteSized, optimizer::optimize_all, tabular::Table};

use crate::{
    error::Error,
    io::{write_table, CsvTableReader},
};

/// Read the given columns of `source` in batches of `chunk_size` rows,
/// optimize every batch on its own and write their concatenation to `output`.
///
/// All requested columns are checked against the header before any row is read.
/// Columns whose batches ended up with different types are widened
/// to a type that represents all of them.
pub fn build_optimized_subset<S: AsRef<str>>(
    source: &Path,
    columns: &[S],
    chunk_size: usize,
    output: &Path,
) -> Result<Table, Error> {
    if chunk_size == 0 {
        return Err(Error::InvalidConfiguration(
            "chunk size must be positive".to_string(),
        ));
    }

    let reader = CsvTableReader::new(source).with_columns(columns);
    let batches = reader.batches(chunk_size)?;

    let mut optimized = Vec::new();
    for batch in batches {
        let batch = optimize_all(batch?);
        log::debug!(
            "optimized batch {} to {} bytes",
            optimized.len() + 1,
            batch.size_bytes()
        );
        optimized.push(batch);
    }

    let subset = if optimized.is_empty() {
        reader.read_head(0)?
    } else {
        Table::concat(optimized)?
    };
    log::info!(
        "optimized subset: {} rows, {} columns, {} bytes",
        subset.row_count(),
        subset.column_count(),
        subset.size_bytes()
    );

    write_table(&subset, output)?;

    Ok(subset)
}

#[cfg(test)]
mod test {
    use assert_fs::{prelude::*, TempDir};
    use test_log::test;

    use tabslim_physical::datatypes::{CellValue, StorageTypeName};

    use super::build_optimized_subset;
    use crate::{
        error::{Error, ReadingError},
        io::CsvTableReader,
    };

    fn source(dir: &TempDir, content: &str) -> assert_fs::fixture::ChildPath {
        let child = dir.child("events.csv");
        child.write_str(content).unwrap();
        child
    }

    fn ten_rows() -> String {
        let mut content = String::from("id,brand,price,extra\n");
        for i in 0..10 {
            let brand = if i % 3 == 0 { "apple" } else { "samsung" };
            content.push_str(&format!("{i},{brand},{}.5,unused\n", i * 10));
        }
        content
    }

    #[test]
    fn chunks_keep_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, &ten_rows());
        let output = dir.child("optimized_subset.csv");

        let subset =
            build_optimized_subset(input.path(), &["id", "brand", "price"], 4, output.path())
                .unwrap();

        assert_eq!(subset.row_count(), 10);
        assert_eq!(subset.column_names(), vec!["id", "brand", "price"]);
        let ids: Vec<CellValue> = subset.column("id").unwrap().values().collect();
        let expected: Vec<CellValue> = (0..10).map(CellValue::UInt).collect();
        assert_eq!(ids, expected);

        let reread = CsvTableReader::new(output.path()).read_all().unwrap();
        let full = CsvTableReader::new(input.path())
            .with_columns(&["id", "brand", "price"])
            .read_all()
            .unwrap();
        assert_eq!(reread, full);
    }

    #[test]
    fn chunk_size_dividing_row_count() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, &ten_rows());
        let output = dir.child("optimized_subset.csv");

        let subset = build_optimized_subset(input.path(), &["id"], 5, output.path()).unwrap();
        assert_eq!(subset.row_count(), 10);
    }

    #[test]
    fn differing_batches_are_widened() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, "value,label\n1,a\n2,a\n-300,a\n1.5,b\n");
        let output = dir.child("out.csv");

        let subset = build_optimized_subset(input.path(), &["value", "label"], 2, output.path())
            .unwrap();

        assert_eq!(
            subset.column("value").unwrap().storage_type(),
            StorageTypeName::Float64
        );
        assert_eq!(
            subset.column("value").unwrap().value(2),
            CellValue::Float64(-300.0)
        );
        output.assert("value,label\n1,a\n2,a\n-300,a\n1.5,b\n");
    }

    #[test]
    fn categorical_batches_share_one_dictionary() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, "brand\nx\nx\nx\ny\ny\ny\n");
        let output = dir.child("out.csv");

        let subset = build_optimized_subset(input.path(), &["brand"], 3, output.path()).unwrap();
        let brand = subset.column("brand").unwrap();

        assert_eq!(brand.storage_type(), StorageTypeName::Categorical);
        assert_eq!(brand.value(0), CellValue::Str("x"));
        assert_eq!(brand.value(5), CellValue::Str("y"));
    }

    #[test]
    fn missing_column_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, &ten_rows());
        let output = dir.child("optimized_subset.csv");

        let result = build_optimized_subset(input.path(), &["id", "color"], 4, output.path());
        assert!(matches!(
            result,
            Err(Error::ReadingError(ReadingError::MissingColumn { column, .. })) if column == "color"
        ));
        output.assert(predicates::path::missing());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, &ten_rows());
        let output = dir.child("optimized_subset.csv");

        assert!(matches!(
            build_optimized_subset(input.path(), &["id"], 0, output.path()),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn header_only_source_writes_header() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir, "id,brand,price\n");
        let output = dir.child("out.csv");

        let subset =
            build_optimized_subset(input.path(), &["id", "brand"], 4, output.path()).unwrap();
        assert_eq!(subset.row_count(), 0);
        assert_eq!(subset.column_names(), vec!["id", "brand"]);
        output.assert("id,brand\n");
    }
}
