use std::fmt::Display;

/// Descriptors to refer to the possible physical representations of a column at runtime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum StorageTypeName {
    /// Owned UTF-8 strings, one per row.
    Text,
    /// Dictionary of distinct strings plus per-row codes.
    Categorical,
    /// Data type [`i8`]
    Int8,
    /// Data type [`i16`]
    Int16,
    /// Data type [`i32`]
    Int32,
    /// Data type [`i64`]
    Int64,
    /// Data type [`u8`]
    UInt8,
    /// Data type [`u16`]
    UInt16,
    /// Data type [`u32`]
    UInt32,
    /// Data type [`u64`]
    UInt64,
    /// Data type [`f32`]
    Float32,
    /// Data type [`f64`]
    Float64,
    /// Seconds since the unix epoch (UTC), stored as [`i64`].
    DateTime,
}

/// Unsigned integer types from narrowest to widest.
const UNSIGNED_TYPES: &[StorageTypeName] = &[
    StorageTypeName::UInt8,
    StorageTypeName::UInt16,
    StorageTypeName::UInt32,
    StorageTypeName::UInt64,
];

/// Signed integer types from narrowest to widest.
const SIGNED_TYPES: &[StorageTypeName] = &[
    StorageTypeName::Int8,
    StorageTypeName::Int16,
    StorageTypeName::Int32,
    StorageTypeName::Int64,
];

impl StorageTypeName {
    /// Return the [LogicalType] of values stored in this representation.
    pub fn logical_type(&self) -> LogicalType {
        match self {
            StorageTypeName::Text => LogicalType::Text,
            StorageTypeName::Categorical => LogicalType::Categorical,
            StorageTypeName::Int8
            | StorageTypeName::Int16
            | StorageTypeName::Int32
            | StorageTypeName::Int64
            | StorageTypeName::UInt8
            | StorageTypeName::UInt16
            | StorageTypeName::UInt32
            | StorageTypeName::UInt64 => LogicalType::Integer,
            StorageTypeName::Float32 | StorageTypeName::Float64 => LogicalType::Float,
            StorageTypeName::DateTime => LogicalType::DateTime,
        }
    }

    /// Whether this is one of the integer types.
    pub fn is_integer(&self) -> bool {
        self.logical_type() == LogicalType::Integer
    }

    /// Whether this is a signed integer type.
    pub fn is_signed_integer(&self) -> bool {
        SIGNED_TYPES.contains(self)
    }

    /// Whether this is one of the floating point types.
    pub fn is_float(&self) -> bool {
        self.logical_type() == LogicalType::Float
    }

    /// Whether values of this type are numbers.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Number of bytes per value for fixed-width types.
    pub fn width_bytes(&self) -> Option<usize> {
        match self {
            StorageTypeName::Text | StorageTypeName::Categorical => None,
            StorageTypeName::Int8 | StorageTypeName::UInt8 => Some(1),
            StorageTypeName::Int16 | StorageTypeName::UInt16 => Some(2),
            StorageTypeName::Int32 | StorageTypeName::UInt32 | StorageTypeName::Float32 => Some(4),
            StorageTypeName::Int64
            | StorageTypeName::UInt64
            | StorageTypeName::Float64
            | StorageTypeName::DateTime => Some(8),
        }
    }

    /// Smallest and largest value representable by an integer type.
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self {
            StorageTypeName::Int8 => Some((i8::MIN.into(), i8::MAX.into())),
            StorageTypeName::Int16 => Some((i16::MIN.into(), i16::MAX.into())),
            StorageTypeName::Int32 => Some((i32::MIN.into(), i32::MAX.into())),
            StorageTypeName::Int64 => Some((i64::MIN.into(), i64::MAX.into())),
            StorageTypeName::UInt8 => Some((0, u8::MAX.into())),
            StorageTypeName::UInt16 => Some((0, u16::MAX.into())),
            StorageTypeName::UInt32 => Some((0, u32::MAX.into())),
            StorageTypeName::UInt64 => Some((0, u64::MAX.into())),
            _ => None,
        }
    }

    /// Return the narrowest integer type that can hold every value in `min..=max`.
    ///
    /// Unsigned types are chosen whenever `min` is not negative.
    pub fn smallest_integer_type(min: i128, max: i128) -> StorageTypeName {
        let candidates = if min >= 0 { UNSIGNED_TYPES } else { SIGNED_TYPES };

        candidates
            .iter()
            .copied()
            .find(|candidate| {
                candidate
                    .integer_bounds()
                    .is_some_and(|(lower, upper)| lower <= min && max <= upper)
            })
            .unwrap_or(if min >= 0 {
                StorageTypeName::UInt64
            } else {
                StorageTypeName::Int64
            })
    }

    /// Return the narrowest type that can represent the values of both integer types.
    ///
    /// Mixing an unsigned type with a signed type needs a signed type of twice
    /// the unsigned width. If no such integer type exists, [StorageTypeName::Float64] is returned.
    pub fn common_integer_type(first: StorageTypeName, second: StorageTypeName) -> StorageTypeName {
        let width = |t: StorageTypeName| t.width_bytes().unwrap_or(8);
        let signed_with_width = |bytes: usize| {
            SIGNED_TYPES
                .iter()
                .copied()
                .find(|t| width(*t) >= bytes)
                .unwrap_or(StorageTypeName::Float64)
        };

        match (first.is_signed_integer(), second.is_signed_integer()) {
            (true, true) | (false, false) => {
                if width(first) >= width(second) {
                    first
                } else {
                    second
                }
            }
            (true, false) => {
                if width(second) >= 8 {
                    StorageTypeName::Float64
                } else {
                    signed_with_width(width(first).max(2 * width(second)))
                }
            }
            (false, true) => Self::common_integer_type(second, first),
        }
    }

    /// Name under which this type appears in memory reports.
    pub fn name(&self) -> &'static str {
        match self {
            StorageTypeName::Text => "object",
            StorageTypeName::Categorical => "category",
            StorageTypeName::Int8 => "int8",
            StorageTypeName::Int16 => "int16",
            StorageTypeName::Int32 => "int32",
            StorageTypeName::Int64 => "int64",
            StorageTypeName::UInt8 => "uint8",
            StorageTypeName::UInt16 => "uint16",
            StorageTypeName::UInt32 => "uint32",
            StorageTypeName::UInt64 => "uint64",
            StorageTypeName::Float32 => "float32",
            StorageTypeName::Float64 => "float64",
            StorageTypeName::DateTime => "datetime",
        }
    }
}

impl Display for StorageTypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Element types as seen by users of a table,
/// independent of the chosen physical representation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LogicalType {
    /// Strings
    Text,
    /// Strings from a finite set of categories
    Categorical,
    /// Integer numbers
    Integer,
    /// Floating point numbers
    Float,
    /// Points in time
    DateTime,
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalType::Text => write!(f, "text"),
            LogicalType::Categorical => write!(f, "categorical"),
            LogicalType::Integer => write!(f, "integer"),
            LogicalType::Float => write!(f, "float"),
            LogicalType::DateTime => write!(f, "datetime"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::StorageTypeName;
    use test_log::test;

    #[test]
    fn smallest_integer_type_prefers_unsigned() {
        assert_eq!(
            StorageTypeName::smallest_integer_type(0, 255),
            StorageTypeName::UInt8
        );
        assert_eq!(
            StorageTypeName::smallest_integer_type(0, 256),
            StorageTypeName::UInt16
        );
        assert_eq!(
            StorageTypeName::smallest_integer_type(-1, 127),
            StorageTypeName::Int8
        );
        assert_eq!(
            StorageTypeName::smallest_integer_type(-1, 128),
            StorageTypeName::Int16
        );
        assert_eq!(
            StorageTypeName::smallest_integer_type(1, 5_000_000_000),
            StorageTypeName::UInt64
        );
        assert_eq!(
            StorageTypeName::smallest_integer_type(i64::MIN.into(), 0),
            StorageTypeName::Int64
        );
    }

    #[test]
    fn common_integer_type_widens() {
        use StorageTypeName::*;

        assert_eq!(StorageTypeName::common_integer_type(Int8, Int32), Int32);
        assert_eq!(StorageTypeName::common_integer_type(UInt16, UInt8), UInt16);
        assert_eq!(StorageTypeName::common_integer_type(UInt8, Int8), Int16);
        assert_eq!(StorageTypeName::common_integer_type(Int64, UInt16), Int64);
        assert_eq!(StorageTypeName::common_integer_type(UInt32, Int8), Int64);
        assert_eq!(StorageTypeName::common_integer_type(UInt64, Int8), Float64);
    }
}
