//! Writing [Table]s as comma separated value files

use std::path::Path;

use csv::WriterBuilder;

use tabslim_physical::tabular::Table;

use crate::error::Error;

use super::{atomic::atomic_write, PROGRESS_NOTIFY_INCREMENT};

/// Write the table with a header row and without any index column.
///
/// Missing values are written as empty fields,
/// categorical values as their category text
/// and date-times as `YYYY-MM-DD HH:MM:SS UTC`.
/// The file at `path` is only replaced once the whole table has been written.
pub fn write_table(table: &Table, path: &Path) -> Result<(), Error> {
    let csv_error = |error: csv::Error| Error::CsvWriting {
        error,
        filename: path.display().to_string(),
    };

    atomic_write(path, |file| {
        let mut writer = WriterBuilder::new()
            .delimiter(b',')
            .double_quote(true)
            .from_writer(file);

        writer
            .write_record(table.column_names())
            .map_err(csv_error)?;

        let mut line_count: u64 = 0;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|value| value.to_string()))
                .map_err(csv_error)?;

            line_count += 1;
            if line_count % PROGRESS_NOTIFY_INCREMENT == 0 {
                log::info!("writing: processed {line_count} lines");
            }
        }

        writer.flush().map_err(|error| Error::WriteFailure {
            error,
            filename: path.display().to_string(),
        })?;
        log::info!(
            "Finished writing \"{}\": {line_count} lines",
            path.display()
        );

        Ok(())
    })
}

#[cfg(test)]
mod test {
    use assert_fs::{prelude::*, TempDir};

    use tabslim_physical::{columnar::Column, optimizer::optimize_all, tabular::Table};

    use super::write_table;
    use crate::io::CsvTableReader;

    #[test]
    fn writes_header_and_values() {
        let dir = TempDir::new().unwrap();
        let out = dir.child("out.csv");

        let table = Table::new(vec![
            Column::from_i64("id", vec![Some(1), None]),
            Column::from_text("brand", vec![Some("a,b".to_string()), Some("c".to_string())]),
        ])
        .unwrap();

        write_table(&table, out.path()).unwrap();
        out.assert("id,brand\n1,\"a,b\"\n,c\n");
    }

    #[test]
    fn optimized_table_reads_back_equal() {
        let dir = TempDir::new().unwrap();
        let out = dir.child("out.csv");

        let table = Table::new(vec![
            Column::from_i64("id", vec![Some(3), Some(200), None, Some(7)]),
            Column::from_f64("price", vec![Some(0.1), Some(2.5), Some(1e10), None]),
            Column::from_text(
                "brand",
                vec![
                    Some("x".to_string()),
                    Some("x".to_string()),
                    Some("x".to_string()),
                    None,
                ],
            ),
        ])
        .unwrap();
        let optimized = optimize_all(table.clone());

        write_table(&optimized, out.path()).unwrap();
        let reread = CsvTableReader::new(out.path()).read_all().unwrap();

        assert_eq!(reread, table);
    }
}
