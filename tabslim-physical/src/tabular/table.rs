//! This module defines [Table].

use hashbrown::HashSet;

use crate::{
    columnar::Column,
    datatypes::CellValue,
    error::Error,
    management::bytesized::ByteSized,
};

/// Ordered collection of uniquely named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create a table from the given columns.
    ///
    /// # Errors
    /// Returns an error if two columns share a name or if the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Result<Self, Error> {
        let row_count = columns.first().map_or(0, Column::len);

        {
            let mut names = HashSet::with_capacity(columns.len());
            for column in &columns {
                if !names.insert(column.name()) {
                    return Err(Error::DuplicateColumn(column.name().to_string()));
                }

                if column.len() != row_count {
                    return Err(Error::ColumnLengthMismatch {
                        column: column.name().to_string(),
                        expected: row_count,
                        found: column.len(),
                    });
                }
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// The columns in table order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Take the columns out of the table.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Names of the columns in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Position of the column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    /// The column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|index| &self.columns[index])
    }

    /// The column with the given name.
    ///
    /// # Errors
    /// Returns [Error::MissingColumn] if there is no such column.
    pub fn try_column(&self, name: &str) -> Result<&Column, Error> {
        self.column(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Apply the given function to every column.
    /// The function has to preserve the number of rows.
    pub fn map_columns<F>(self, function: F) -> Self
    where
        F: FnMut(Column) -> Column,
    {
        let row_count = self.row_count;
        let columns = self.columns.into_iter().map(function).collect::<Vec<_>>();
        debug_assert!(columns.iter().all(|column| column.len() == row_count));

        Self { columns, row_count }
    }

    /// Values of the given row in column order.
    pub fn row(&self, index: usize) -> Vec<CellValue<'_>> {
        self.columns
            .iter()
            .map(|column| column.value(index))
            .collect()
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = Vec<CellValue<'_>>> + '_ {
        (0..self.row_count).map(|index| self.row(index))
    }

    /// Concatenate tables with the same columns, preserving the order of their rows.
    ///
    /// Each column is converted into the common representation of its parts,
    /// see [Column::concat].
    ///
    /// # Errors
    /// Returns [Error::SchemaMismatch] if the tables do not share the same column names.
    pub fn concat(tables: Vec<Table>) -> Result<Self, Error> {
        let Some(first) = tables.first() else {
            return Ok(Table::default());
        };

        let names = first
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        for table in &tables {
            if table.column_names() != names {
                return Err(Error::SchemaMismatch {
                    expected: names,
                    found: table
                        .column_names()
                        .into_iter()
                        .map(String::from)
                        .collect(),
                });
            }
        }

        let mut parts = names
            .iter()
            .map(|_| Vec::with_capacity(tables.len()))
            .collect::<Vec<Vec<Column>>>();
        for table in tables {
            for (index, column) in table.into_columns().into_iter().enumerate() {
                parts[index].push(column);
            }
        }

        let columns = parts
            .into_iter()
            .filter_map(Column::concat)
            .collect::<Vec<_>>();

        Table::new(columns)
    }
}

impl ByteSized for Table {
    fn size_bytes(&self) -> u64 {
        self.columns.iter().map(ByteSized::size_bytes).sum()
    }
}
