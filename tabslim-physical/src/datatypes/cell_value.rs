use std::fmt::Display;

use chrono::DateTime;

use super::float::widen_f32;

/// Borrowed view on a single value of a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellValue<'a> {
    /// Missing value
    Null,
    /// Text, either stored directly or looked up in a category dictionary
    Str(&'a str),
    /// Value of a signed integer column
    Int(i64),
    /// Value of an unsigned integer column
    UInt(u64),
    /// Value of a [`f32`] column
    Float32(f32),
    /// Value of a [`f64`] column
    Float64(f64),
    /// Seconds since the unix epoch
    DateTime(i64),
}

impl<'a> CellValue<'a> {
    /// Whether this is a missing value.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Return the value as string slice, if it is text.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            CellValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Return the value as [`i128`], if it is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            CellValue::Int(value) => Some(i128::from(*value)),
            CellValue::UInt(value) => Some(i128::from(*value)),
            _ => None,
        }
    }

    /// Return the value as [`f64`], if it is a number.
    ///
    /// Integers beyond 2^53 lose precision.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(value) => Some(*value as f64),
            CellValue::UInt(value) => Some(*value as f64),
            CellValue::Float32(value) => Some(widen_f32(*value)),
            CellValue::Float64(value) => Some(*value),
            _ => None,
        }
    }

    /// Return the number of seconds since the unix epoch, if this is a date-time.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            CellValue::DateTime(seconds) => Some(*seconds),
            _ => None,
        }
    }
}

impl Display for CellValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Str(s) => write!(f, "{s}"),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::UInt(value) => write!(f, "{value}"),
            CellValue::Float32(value) => write!(f, "{value}"),
            CellValue::Float64(value) => write!(f, "{value}"),
            CellValue::DateTime(seconds) => match DateTime::from_timestamp(*seconds, 0) {
                Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S UTC")),
                None => write!(f, "{seconds}"),
            },
        }
    }
}
