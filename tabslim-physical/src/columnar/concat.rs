//! This module implements the concatenation of columns
//! whose parts were stored in different physical representations.

use bitvec::vec::BitVec;

use crate::{datatypes::StorageTypeName, dictionary::CategoryDictionary};

use super::{
    categorical::CategoricalData,
    column::{Column, ColumnData},
};

/// Return the representation able to hold the values of both storage types.
pub fn common_storage_type(first: StorageTypeName, second: StorageTypeName) -> StorageTypeName {
    if first == second {
        return first;
    }

    if first.is_integer() && second.is_integer() {
        return StorageTypeName::common_integer_type(first, second);
    }

    if first.is_float() && second.is_float() {
        return StorageTypeName::Float64;
    }

    if first.is_numeric() && second.is_numeric() {
        return StorageTypeName::Float64;
    }

    StorageTypeName::Text
}

impl Column {
    /// Convert this column into the given representation.
    ///
    /// Numbers are converted between integer and float types,
    /// every type can be converted into text.
    /// Columns without any value can be converted into every type.
    ///
    /// # Panics
    /// Panics if the conversion is not supported,
    /// i.e. if `target` is not the [common_storage_type] of the current type and `target`.
    pub fn cast(self, target: StorageTypeName) -> Column {
        let current = self.storage_type();
        if current == target {
            return self;
        }

        let (name, data, validity) = self.into_parts();
        let len = data.len();
        let all_missing =
            len == 0 || validity.as_ref().is_some_and(|validity| validity.not_any());

        let data = if all_missing {
            empty_data(target, len)
        } else if target.is_integer() {
            let values = data
                .integer_iter()
                .unwrap_or_else(|| unreachable!("cannot cast {current} to {target}"));
            ColumnData::from_integers(target, values)
        } else if target.is_float() {
            let values = data
                .float_iter()
                .unwrap_or_else(|| unreachable!("cannot cast {current} to {target}"));
            ColumnData::from_floats(target, values)
        } else if target == StorageTypeName::Text {
            let values = (0..len)
                .map(|index| {
                    if validity.as_ref().map_or(true, |validity| validity[index]) {
                        data.cell(index).to_string()
                    } else {
                        String::new()
                    }
                })
                .collect();
            ColumnData::Text(values)
        } else {
            unreachable!("cannot cast {current} to {target}")
        };

        Column::from_parts(name, data, validity)
    }

    /// Concatenate the given parts of a column into a single column,
    /// converting all parts into their common representation.
    ///
    /// Parts without any value adopt the type of the other parts.
    /// Categorical parts are merged into a single dictionary
    /// whose categories appear in the order they are first seen.
    ///
    /// Returns `None` if `parts` is empty.
    pub fn concat(parts: Vec<Column>) -> Option<Column> {
        let name = parts.first()?.name().to_string();

        let informative = parts
            .iter()
            .filter(|part| part.null_count() < part.len())
            .map(Column::storage_type)
            .reduce(common_storage_type);
        let target = informative.unwrap_or_else(|| parts[0].storage_type());

        log::trace!("concatenating {} parts of column {name} as {target}", parts.len());

        let total_len = parts.iter().map(Column::len).sum::<usize>();
        let mut validity = BitVec::with_capacity(total_len);
        for part in &parts {
            match part.validity() {
                Some(bits) => validity.extend_from_bitslice(bits),
                None => validity.extend(std::iter::repeat(true).take(part.len())),
            }
        }

        let data = if target == StorageTypeName::Categorical {
            concat_categorical(parts, &validity)
        } else {
            let mut converted = parts.into_iter().map(|part| part.cast(target).into_parts().1);
            let first = converted
                .next()
                .unwrap_or_else(|| unreachable!("parts are not empty"));
            converted.fold(first, append_data)
        };

        Some(Column::from_parts(name, data, Some(validity)))
    }
}

/// Data of the given type and length without meaningful values.
fn empty_data(target: StorageTypeName, len: usize) -> ColumnData {
    match target {
        StorageTypeName::Text => ColumnData::Text(vec![String::new(); len]),
        StorageTypeName::Categorical => {
            CategoricalData::from_dictionary(CategoryDictionary::new(), vec![0; len]).into()
        }
        StorageTypeName::Float32 | StorageTypeName::Float64 => {
            ColumnData::from_floats(target, std::iter::repeat(0.0).take(len))
        }
        StorageTypeName::DateTime => ColumnData::DateTime(vec![0; len]),
        _ => ColumnData::from_integers(target, std::iter::repeat(0).take(len)),
    }
}

/// Merge categorical parts into one dictionary.
/// Parts without any value contribute placeholder codes.
fn concat_categorical(parts: Vec<Column>, validity: &BitVec) -> ColumnData {
    let mut dictionary = CategoryDictionary::new();
    let mut codes = Vec::with_capacity(validity.len());

    for part in parts {
        match part.data() {
            ColumnData::Categorical(data) => {
                let remap = data
                    .categories()
                    .iter()
                    .map(|category| CategoricalData::code_of(dictionary.add_str(category).value()))
                    .collect::<Vec<u32>>();
                codes.extend(
                    data.codes()
                        .iter()
                        .map(|code| remap.get(code).copied().unwrap_or(0)),
                );
            }
            _ => codes.extend(std::iter::repeat(0).take(part.len())),
        }
    }

    CategoricalData::from_dictionary(dictionary, codes).into()
}

/// Append data of the same representation.
fn append_data(first: ColumnData, second: ColumnData) -> ColumnData {
    match (first, second) {
        (ColumnData::Text(mut a), ColumnData::Text(b)) => {
            a.extend(b);
            ColumnData::Text(a)
        }
        (ColumnData::Int8(mut a), ColumnData::Int8(b)) => {
            a.extend(b);
            ColumnData::Int8(a)
        }
        (ColumnData::Int16(mut a), ColumnData::Int16(b)) => {
            a.extend(b);
            ColumnData::Int16(a)
        }
        (ColumnData::Int32(mut a), ColumnData::Int32(b)) => {
            a.extend(b);
            ColumnData::Int32(a)
        }
        (ColumnData::Int64(mut a), ColumnData::Int64(b)) => {
            a.extend(b);
            ColumnData::Int64(a)
        }
        (ColumnData::UInt8(mut a), ColumnData::UInt8(b)) => {
            a.extend(b);
            ColumnData::UInt8(a)
        }
        (ColumnData::UInt16(mut a), ColumnData::UInt16(b)) => {
            a.extend(b);
            ColumnData::UInt16(a)
        }
        (ColumnData::UInt32(mut a), ColumnData::UInt32(b)) => {
            a.extend(b);
            ColumnData::UInt32(a)
        }
        (ColumnData::UInt64(mut a), ColumnData::UInt64(b)) => {
            a.extend(b);
            ColumnData::UInt64(a)
        }
        (ColumnData::Float32(mut a), ColumnData::Float32(b)) => {
            a.extend(b);
            ColumnData::Float32(a)
        }
        (ColumnData::Float64(mut a), ColumnData::Float64(b)) => {
            a.extend(b);
            ColumnData::Float64(a)
        }
        (ColumnData::DateTime(mut a), ColumnData::DateTime(b)) => {
            a.extend(b);
            ColumnData::DateTime(a)
        }
        (a, b) => unreachable!(
            "parts are converted to the same type before appending, found {} and {}",
            a.storage_type(),
            b.storage_type()
        ),
    }
}

impl From<CategoricalData> for ColumnData {
    fn from(value: CategoricalData) -> Self {
        ColumnData::Categorical(value)
    }
}
