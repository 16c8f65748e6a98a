//! This module defines [Column], a named sequence of values
//! with a fixed physical representation.

use bitvec::vec::BitVec;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
    datatypes::{
        float::{narrow_f64, widen_f32},
        CellValue, LogicalType, StorageTypeName,
    },
    error::Error,
    management::bytesized::{size_inner_vec_flat, size_strings_deep, ByteSized},
};

use super::categorical::CategoricalData;

/// Physical storage of the values of a column.
///
/// Positions without a value hold a placeholder (empty string, zero or code 0)
/// which is masked by the validity bitmap of the [Column].
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Owned strings
    Text(Vec<String>),
    /// Dictionary-encoded strings
    Categorical(CategoricalData),
    /// Values of type [`i8`]
    Int8(Vec<i8>),
    /// Values of type [`i16`]
    Int16(Vec<i16>),
    /// Values of type [`i32`]
    Int32(Vec<i32>),
    /// Values of type [`i64`]
    Int64(Vec<i64>),
    /// Values of type [`u8`]
    UInt8(Vec<u8>),
    /// Values of type [`u16`]
    UInt16(Vec<u16>),
    /// Values of type [`u32`]
    UInt32(Vec<u32>),
    /// Values of type [`u64`]
    UInt64(Vec<u64>),
    /// Values of type [`f32`]
    Float32(Vec<f32>),
    /// Values of type [`f64`]
    Float64(Vec<f64>),
    /// Seconds since the unix epoch
    DateTime(Vec<i64>),
}

impl ColumnData {
    /// Number of stored values, including placeholders.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
            ColumnData::Int8(values) => values.len(),
            ColumnData::Int16(values) => values.len(),
            ColumnData::Int32(values) => values.len(),
            ColumnData::Int64(values) => values.len(),
            ColumnData::UInt8(values) => values.len(),
            ColumnData::UInt16(values) => values.len(),
            ColumnData::UInt32(values) => values.len(),
            ColumnData::UInt64(values) => values.len(),
            ColumnData::Float32(values) => values.len(),
            ColumnData::Float64(values) => values.len(),
            ColumnData::DateTime(values) => values.len(),
        }
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The [StorageTypeName] of this representation.
    pub fn storage_type(&self) -> StorageTypeName {
        match self {
            ColumnData::Text(_) => StorageTypeName::Text,
            ColumnData::Categorical(_) => StorageTypeName::Categorical,
            ColumnData::Int8(_) => StorageTypeName::Int8,
            ColumnData::Int16(_) => StorageTypeName::Int16,
            ColumnData::Int32(_) => StorageTypeName::Int32,
            ColumnData::Int64(_) => StorageTypeName::Int64,
            ColumnData::UInt8(_) => StorageTypeName::UInt8,
            ColumnData::UInt16(_) => StorageTypeName::UInt16,
            ColumnData::UInt32(_) => StorageTypeName::UInt32,
            ColumnData::UInt64(_) => StorageTypeName::UInt64,
            ColumnData::Float32(_) => StorageTypeName::Float32,
            ColumnData::Float64(_) => StorageTypeName::Float64,
            ColumnData::DateTime(_) => StorageTypeName::DateTime,
        }
    }

    /// Stored value at the given position, ignoring validity.
    pub fn cell(&self, index: usize) -> CellValue<'_> {
        match self {
            ColumnData::Text(values) => CellValue::Str(&values[index]),
            ColumnData::Categorical(values) => {
                values.get(index).map_or(CellValue::Null, CellValue::Str)
            }
            ColumnData::Int8(values) => CellValue::Int(values[index].into()),
            ColumnData::Int16(values) => CellValue::Int(values[index].into()),
            ColumnData::Int32(values) => CellValue::Int(values[index].into()),
            ColumnData::Int64(values) => CellValue::Int(values[index]),
            ColumnData::UInt8(values) => CellValue::UInt(values[index].into()),
            ColumnData::UInt16(values) => CellValue::UInt(values[index].into()),
            ColumnData::UInt32(values) => CellValue::UInt(values[index].into()),
            ColumnData::UInt64(values) => CellValue::UInt(values[index]),
            ColumnData::Float32(values) => CellValue::Float32(values[index]),
            ColumnData::Float64(values) => CellValue::Float64(values[index]),
            ColumnData::DateTime(values) => CellValue::DateTime(values[index]),
        }
    }

    /// Iterate over the stored values of an integer column, widened to [`i128`].
    ///
    /// Returns `None` for non-integer columns.
    pub fn integer_iter(&self) -> Option<Box<dyn Iterator<Item = i128> + '_>> {
        let iter: Box<dyn Iterator<Item = i128> + '_> = match self {
            ColumnData::Int8(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::Int16(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::Int32(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::Int64(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::UInt8(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::UInt16(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::UInt32(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            ColumnData::UInt64(values) => Box::new(values.iter().map(|&v| i128::from(v))),
            _ => return None,
        };

        Some(iter)
    }

    /// Iterate over the stored values of a numeric column as [`f64`].
    ///
    /// [`f32`] values are widened through their decimal representation.
    /// Returns `None` for non-numeric columns.
    #[allow(clippy::cast_precision_loss)]
    pub fn float_iter(&self) -> Option<Box<dyn Iterator<Item = f64> + '_>> {
        let iter: Box<dyn Iterator<Item = f64> + '_> = match self {
            ColumnData::Float32(values) => Box::new(values.iter().map(|&v| widen_f32(v))),
            ColumnData::Float64(values) => Box::new(values.iter().copied()),
            _ => Box::new(self.integer_iter()?.map(|v| v as f64)),
        };

        Some(iter)
    }

    /// Build integer data of the given type.
    ///
    /// Values outside of the range of `target` are truncated,
    /// callers choose `target` so that this does not happen.
    ///
    /// # Panics
    /// Panics if `target` is not an integer type.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_integers<I>(target: StorageTypeName, values: I) -> Self
    where
        I: Iterator<Item = i128>,
    {
        match target {
            StorageTypeName::Int8 => ColumnData::Int8(values.map(|v| v as i8).collect()),
            StorageTypeName::Int16 => ColumnData::Int16(values.map(|v| v as i16).collect()),
            StorageTypeName::Int32 => ColumnData::Int32(values.map(|v| v as i32).collect()),
            StorageTypeName::Int64 => ColumnData::Int64(values.map(|v| v as i64).collect()),
            StorageTypeName::UInt8 => ColumnData::UInt8(values.map(|v| v as u8).collect()),
            StorageTypeName::UInt16 => ColumnData::UInt16(values.map(|v| v as u16).collect()),
            StorageTypeName::UInt32 => ColumnData::UInt32(values.map(|v| v as u32).collect()),
            StorageTypeName::UInt64 => ColumnData::UInt64(values.map(|v| v as u64).collect()),
            _ => unreachable!("integer data can only be built for integer types, not {target}"),
        }
    }

    /// Build floating point data of the given type.
    ///
    /// # Panics
    /// Panics if `target` is not a floating point type.
    pub fn from_floats<I>(target: StorageTypeName, values: I) -> Self
    where
        I: Iterator<Item = f64>,
    {
        match target {
            StorageTypeName::Float32 => {
                ColumnData::Float32(values.map(narrow_f64).collect())
            }
            StorageTypeName::Float64 => ColumnData::Float64(values.collect()),
            _ => unreachable!("float data can only be built for float types, not {target}"),
        }
    }
}

impl ByteSized for ColumnData {
    fn size_bytes(&self) -> u64 {
        match self {
            ColumnData::Text(values) => size_strings_deep(values),
            ColumnData::Categorical(values) => values.size_bytes(),
            ColumnData::Int8(values) => size_inner_vec_flat(values),
            ColumnData::Int16(values) => size_inner_vec_flat(values),
            ColumnData::Int32(values) => size_inner_vec_flat(values),
            ColumnData::Int64(values) => size_inner_vec_flat(values),
            ColumnData::UInt8(values) => size_inner_vec_flat(values),
            ColumnData::UInt16(values) => size_inner_vec_flat(values),
            ColumnData::UInt32(values) => size_inner_vec_flat(values),
            ColumnData::UInt64(values) => size_inner_vec_flat(values),
            ColumnData::Float32(values) => size_inner_vec_flat(values),
            ColumnData::Float64(values) => size_inner_vec_flat(values),
            ColumnData::DateTime(values) => size_inner_vec_flat(values),
        }
    }
}

/// Split optional values into placeholders and a validity bitmap.
/// The bitmap is omitted if every value is present.
fn split_options<T: Default>(values: Vec<Option<T>>) -> (Vec<T>, Option<BitVec>) {
    let validity = values.iter().map(Option::is_some).collect::<BitVec>();
    let values = values
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<T>>();

    if validity.all() {
        (values, None)
    } else {
        (values, Some(validity))
    }
}

/// A named column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
    /// Bit `i` is cleared if row `i` has no value; `None` if all rows have values.
    validity: Option<BitVec>,
}

impl Column {
    /// Create a column in which every row has a value.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
            validity: None,
        }
    }

    /// Attach a validity bitmap to this column.
    ///
    /// # Errors
    /// Returns an error if the bitmap length differs from the column length.
    pub fn with_validity(mut self, validity: BitVec) -> Result<Self, Error> {
        if validity.len() != self.data.len() {
            return Err(Error::ValidityLengthMismatch {
                column: self.name,
                expected: self.data.len(),
                found: validity.len(),
            });
        }

        self.validity = if validity.all() { None } else { Some(validity) };
        Ok(self)
    }

    /// Create a text column from optional strings.
    pub fn from_text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        let (values, validity) = split_options(values);
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
            validity,
        }
    }

    /// Create an [`i64`] column from optional values.
    pub fn from_i64(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        let (values, validity) = split_options(values);
        Self {
            name: name.into(),
            data: ColumnData::Int64(values),
            validity,
        }
    }

    /// Create a [`u64`] column from optional values.
    pub fn from_u64(name: impl Into<String>, values: Vec<Option<u64>>) -> Self {
        let (values, validity) = split_options(values);
        Self {
            name: name.into(),
            data: ColumnData::UInt64(values),
            validity,
        }
    }

    /// Create a [`f64`] column from optional values.
    pub fn from_f64(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let (values, validity) = split_options(values);
        Self {
            name: name.into(),
            data: ColumnData::Float64(values),
            validity,
        }
    }

    /// Name of the column.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical data of the column.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Validity bitmap, if some rows have no value.
    pub fn validity(&self) -> Option<&BitVec> {
        self.validity.as_ref()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the given row has a value.
    pub fn is_valid(&self, index: usize) -> bool {
        self.validity
            .as_ref()
            .map_or(true, |validity| validity[index])
    }

    /// Number of rows without a value.
    pub fn null_count(&self) -> usize {
        self.validity
            .as_ref()
            .map_or(0, |validity| validity.count_zeros())
    }

    /// Physical representation of the column.
    pub fn storage_type(&self) -> StorageTypeName {
        self.data.storage_type()
    }

    /// Logical element type of the column.
    pub fn logical_type(&self) -> LogicalType {
        self.storage_type().logical_type()
    }

    /// Value of the given row.
    pub fn value(&self, index: usize) -> CellValue<'_> {
        if self.is_valid(index) {
            self.data.cell(index)
        } else {
            CellValue::Null
        }
    }

    /// Iterate over the values of all rows.
    pub fn values(&self) -> impl Iterator<Item = CellValue<'_>> + '_ {
        (0..self.len()).map(|index| self.value(index))
    }

    /// Iterate over the values of the rows that have one.
    pub fn valid_values(&self) -> impl Iterator<Item = CellValue<'_>> + '_ {
        self.values().filter(|value| !value.is_null())
    }

    /// Replace the physical data, keeping name and validity.
    pub(crate) fn replace_data(self, data: ColumnData) -> Self {
        debug_assert_eq!(data.len(), self.data.len());

        Self {
            name: self.name,
            data,
            validity: self.validity,
        }
    }

    pub(crate) fn into_parts(self) -> (String, ColumnData, Option<BitVec>) {
        (self.name, self.data, self.validity)
    }

    pub(crate) fn from_parts(name: String, data: ColumnData, validity: Option<BitVec>) -> Self {
        Self {
            name,
            data,
            validity: validity.filter(|validity| !validity.all()),
        }
    }

    /// Convert a text or categorical column into a date-time column.
    ///
    /// Accepted formats are RFC 3339, `%Y-%m-%d %H:%M:%S` with an optional ` UTC` suffix,
    /// `%Y-%m-%dT%H:%M:%S` and plain dates, all interpreted as UTC.
    ///
    /// # Errors
    /// Returns an error if the column holds a value that is not a date-time
    /// or if the column is neither text nor categorical.
    pub fn to_datetime(self) -> Result<Self, Error> {
        match self.storage_type() {
            StorageTypeName::DateTime => return Ok(self),
            StorageTypeName::Text | StorageTypeName::Categorical => {}
            storage_type => {
                return Err(Error::NotDateTimeConvertible {
                    column: self.name,
                    storage_type: storage_type.to_string(),
                })
            }
        }

        let mut timestamps = Vec::with_capacity(self.len());
        for value in self.values() {
            match value {
                CellValue::Str(text) => {
                    let timestamp =
                        parse_timestamp(text).ok_or_else(|| Error::InvalidDateTime {
                            column: self.name.clone(),
                            value: text.to_string(),
                        })?;
                    timestamps.push(timestamp);
                }
                _ => timestamps.push(0),
            }
        }

        Ok(self.replace_data(ColumnData::DateTime(timestamps)))
    }
}

impl ByteSized for Column {
    fn size_bytes(&self) -> u64 {
        let validity = self
            .validity
            .as_ref()
            .map_or(0, |validity| validity.len().div_ceil(8) as u64);

        self.data.size_bytes() + validity
    }
}

/// Parse a textual date-time into seconds since the unix epoch (UTC).
fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.timestamp());
    }

    let naive = text.strip_suffix(" UTC").unwrap_or(text);
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(datetime.and_utc().timestamp());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp())
}

#[cfg(test)]
mod test {
    use super::{parse_timestamp, Column, ColumnData};
    use crate::{
        datatypes::{CellValue, StorageTypeName},
        management::bytesized::ByteSized,
    };
    use bitvec::{bitvec, order::Lsb0};
    use test_log::test;

    #[test]
    fn optional_values_produce_validity() {
        let column = Column::from_i64("user_id", vec![Some(1), None, Some(3)]);

        assert_eq!(column.len(), 3);
        assert_eq!(column.null_count(), 1);
        assert_eq!(column.value(0), CellValue::Int(1));
        assert_eq!(column.value(1), CellValue::Null);
        assert_eq!(column.valid_values().count(), 2);
    }

    #[test]
    fn complete_values_have_no_bitmap() {
        let column = Column::from_f64("price", vec![Some(1.5), Some(2.5)]);

        assert!(column.validity().is_none());
        assert_eq!(column.size_bytes(), 16);
    }

    #[test]
    fn text_size_includes_string_bytes() {
        let column = Column::from_text("brand", vec![Some("apple".to_string()), None]);
        let expected = 2 * std::mem::size_of::<String>() as u64 + 5 + 1;

        assert_eq!(column.size_bytes(), expected);
    }

    #[test]
    fn validity_length_is_checked() {
        let column = Column::new("a", ColumnData::UInt8(vec![1, 2]));

        assert!(column.clone().with_validity(bitvec![1, 0, 1]).is_err());
        let column = column.with_validity(bitvec![1, 0]).unwrap();
        assert_eq!(column.value(1), CellValue::Null);
    }

    #[test]
    fn parse_timestamps() {
        assert_eq!(parse_timestamp("2019-12-01 00:00:00 UTC"), Some(1_575_158_400));
        assert_eq!(parse_timestamp("2019-12-01T00:00:10"), Some(1_575_158_410));
        assert_eq!(parse_timestamp("2019-12-01T01:00:00+01:00"), Some(1_575_158_400));
        assert_eq!(parse_timestamp("2019-12-02"), Some(1_575_244_800));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn to_datetime_keeps_nulls() {
        let column = Column::from_text(
            "event_time",
            vec![Some("2019-12-01 10:00:00 UTC".to_string()), None],
        )
        .to_datetime()
        .unwrap();

        assert_eq!(column.storage_type(), StorageTypeName::DateTime);
        assert_eq!(column.value(0), CellValue::DateTime(1_575_194_400));
        assert_eq!(column.value(1), CellValue::Null);
    }

    #[test]
    fn to_datetime_rejects_garbage() {
        let column = Column::from_text("event_time", vec![Some("soon".to_string())]);
        assert!(column.to_datetime().is_err());

        let column = Column::from_i64("event_time", vec![Some(1)]);
        assert!(column.to_datetime().is_err());
    }
}
