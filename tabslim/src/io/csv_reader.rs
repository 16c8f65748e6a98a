//! Reading of comma separated value files into [Table]s

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use csv::{Reader, ReaderBuilder, StringRecord};

use tabslim_physical::{columnar::Column, tabular::Table};

use crate::error::{Error, ReadingError};

use super::PROGRESS_NOTIFY_INCREMENT;

/// Field contents that are read as missing values.
///
/// Fields are trimmed before they are compared against this list.
pub const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null", "#N/A"];

/// Reader for delimited files with a header row.
///
/// The type of every column is inferred from its values:
/// a column is read as 64-bit integers if all its present values parse as such,
/// as unsigned 64-bit integers if they only fit that range,
/// otherwise as 64-bit floats if they all parse as floats,
/// and as text in every other case.
/// Columns without any present value are read as text.
///
/// When reading in batches, inference happens per batch,
/// so different batches may assign different types to the same column.
#[derive(Debug, Clone)]
pub struct CsvTableReader {
    path: PathBuf,
    columns: Option<Vec<String>>,
}

/// Header names of the selected columns and their position in each record
#[derive(Debug, Clone)]
struct Projection {
    names: Vec<String>,
    indices: Vec<usize>,
}

impl CsvTableReader {
    /// Create a reader for the file at the given path, reading all columns.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: None,
        }
    }

    /// Only read the given columns.
    ///
    /// The resulting tables keep the order in which the columns appear in the file.
    pub fn with_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    /// Path of the file read by this reader
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn filename(&self) -> String {
        self.path.display().to_string()
    }

    fn csv_error(&self) -> impl FnOnce(csv::Error) -> ReadingError + '_ {
        move |error| ReadingError::Csv {
            error,
            filename: self.filename(),
        }
    }

    /// Open the file, read its header and resolve the selected columns.
    fn open(&self) -> Result<(Reader<BufReader<File>>, Projection), ReadingError> {
        let file = File::open(&self.path).map_err(|error| ReadingError::IOReading {
            error,
            filename: self.filename(),
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .double_quote(true)
            .flexible(false)
            .from_reader(BufReader::new(file));

        let header = reader.headers().map_err(self.csv_error())?.clone();
        if header.is_empty() {
            return Err(ReadingError::MissingHeaders(self.filename()));
        }

        let projection = match &self.columns {
            None => Projection {
                names: header.iter().map(str::to_string).collect(),
                indices: (0..header.len()).collect(),
            },
            Some(columns) => {
                let mut indices = Vec::with_capacity(columns.len());
                for column in columns {
                    match header.iter().position(|name| name == column) {
                        Some(index) => indices.push(index),
                        None => {
                            return Err(ReadingError::MissingColumn {
                                column: column.clone(),
                                filename: self.filename(),
                            })
                        }
                    }
                }
                indices.sort_unstable();
                indices.dedup();

                Projection {
                    names: indices.iter().map(|&i| header[i].to_string()).collect(),
                    indices,
                }
            }
        };

        Ok((reader, projection))
    }

    fn read_rows(&self, limit: Option<usize>) -> Result<Table, Error> {
        let (mut reader, projection) = self.open()?;
        let mut builder = BatchBuilder::new(projection.names);
        let mut record = StringRecord::new();
        let mut line_count: u64 = 0;

        while limit.map_or(true, |limit| builder.len() < limit) {
            if !reader
                .read_record(&mut record)
                .map_err(self.csv_error())?
            {
                break;
            }
            builder.push(&record, &projection.indices);

            line_count += 1;
            if line_count % PROGRESS_NOTIFY_INCREMENT == 0 {
                log::info!("loading: processed {line_count} lines");
            }
        }
        log::info!(
            "Finished loading \"{}\": processed {line_count} lines",
            self.filename()
        );

        builder.finish()
    }

    /// Read the whole file.
    pub fn read_all(&self) -> Result<Table, Error> {
        self.read_rows(None)
    }

    /// Read at most the first `rows` data rows of the file.
    pub fn read_head(&self, rows: usize) -> Result<Table, Error> {
        self.read_rows(Some(rows))
    }

    /// Read the file as a sequence of tables with at most `batch_size` rows each.
    ///
    /// The header is checked before this function returns,
    /// so a missing column is reported before any batch is read.
    pub fn batches(&self, batch_size: usize) -> Result<TableBatches, Error> {
        if batch_size == 0 {
            return Err(Error::InvalidConfiguration(
                "batch size must be positive".to_string(),
            ));
        }

        let (reader, projection) = self.open()?;

        Ok(TableBatches {
            reader,
            projection,
            batch_size,
            record: StringRecord::new(),
            filename: self.filename(),
            finished: false,
            batch_count: 0,
        })
    }
}

/// Iterator over consecutive batches of a file, created by [CsvTableReader::batches]
#[derive(Debug)]
pub struct TableBatches {
    reader: Reader<BufReader<File>>,
    projection: Projection,
    batch_size: usize,
    record: StringRecord,
    filename: String,
    finished: bool,
    batch_count: usize,
}

impl TableBatches {
    /// Names of the columns contained in each batch
    pub fn column_names(&self) -> &[String] {
        &self.projection.names
    }
}

impl Iterator for TableBatches {
    type Item = Result<Table, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut builder = BatchBuilder::new(self.projection.names.clone());
        while builder.len() < self.batch_size {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => builder.push(&self.record, &self.projection.indices),
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(error) => {
                    self.finished = true;
                    return Some(Err(ReadingError::Csv {
                        error,
                        filename: self.filename.clone(),
                    }
                    .into()));
                }
            }
        }

        if builder.len() == 0 {
            return None;
        }

        self.batch_count += 1;
        log::debug!(
            "read batch {} of \"{}\" with {} rows",
            self.batch_count,
            self.filename,
            builder.len()
        );

        Some(builder.finish())
    }
}

/// Collects the raw fields of each selected column
#[derive(Debug)]
struct BatchBuilder {
    names: Vec<String>,
    fields: Vec<Vec<Option<String>>>,
    rows: usize,
}

impl BatchBuilder {
    fn new(names: Vec<String>) -> Self {
        let fields = vec![Vec::new(); names.len()];
        Self {
            names,
            fields,
            rows: 0,
        }
    }

    fn len(&self) -> usize {
        self.rows
    }

    fn push(&mut self, record: &StringRecord, indices: &[usize]) {
        for (column, &index) in self.fields.iter_mut().zip(indices) {
            let field = record.get(index).unwrap_or("");
            if NULL_MARKERS.contains(&field.trim()) {
                column.push(None);
            } else {
                column.push(Some(field.to_string()));
            }
        }
        self.rows += 1;
    }

    fn finish(self) -> Result<Table, Error> {
        let columns = self
            .names
            .into_iter()
            .zip(self.fields)
            .map(|(name, fields)| infer_column(name, fields))
            .collect();

        Ok(Table::new(columns)?)
    }
}

/// Build a column of the narrowest fitting source type for the given fields.
fn infer_column(name: String, fields: Vec<Option<String>>) -> Column {
    let mut present = fields.iter().flatten().peekable();
    if present.peek().is_none() {
        return Column::from_text(name, fields);
    }

    if present.all(|field| field.trim().parse::<i64>().is_ok()) {
        let values = fields
            .iter()
            .map(|field| field.as_ref().and_then(|f| f.trim().parse::<i64>().ok()))
            .collect();
        return Column::from_i64(name, values);
    }

    // integers beyond the range of i64
    if fields
        .iter()
        .flatten()
        .all(|field| field.trim().parse::<u64>().is_ok())
    {
        let values = fields
            .iter()
            .map(|field| field.as_ref().and_then(|f| f.trim().parse::<u64>().ok()))
            .collect();
        return Column::from_u64(name, values);
    }

    if fields
        .iter()
        .flatten()
        .all(|field| field.trim().parse::<f64>().is_ok())
    {
        let values = fields
            .iter()
            .map(|field| field.as_ref().and_then(|f| f.trim().parse::<f64>().ok()))
            .collect();
        return Column::from_f64(name, values);
    }

    Column::from_text(name, fields)
}
