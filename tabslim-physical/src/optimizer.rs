//! This module implements the passes that narrow the physical representation of columns.
//!
//! Every pass consumes a [Table] and returns a table with the same rows, columns and
//! logical values, where some columns use a smaller representation:
//! * [optimize_objects] dictionary-encodes text columns with few distinct values,
//! * [optimize_integers] stores integer columns at the narrowest width fitting their range,
//! * [optimize_floats] stores [`f64`] columns as [`f32`] if no decimal digits are lost.

use std::borrow::Cow;

use hashbrown::HashSet;

use crate::{
    columnar::{CategoricalData, Column, ColumnData},
    datatypes::{float::fits_f32, CellValue, StorageTypeName},
    management::bytesized::ByteSized,
    tabular::Table,
};

/// Text columns whose ratio of distinct values to rows is below this threshold
/// are encoded as categorical columns.
pub const CATEGORICAL_RATIO_THRESHOLD: f64 = 0.5;

/// Ratio of distinct values to rows of the given column,
/// or `None` if the column has no rows.
///
/// Rows without a value do not count as a distinct value, but do count as a row.
#[allow(clippy::cast_precision_loss)]
pub fn distinct_ratio(column: &Column) -> Option<f64> {
    if column.is_empty() {
        return None;
    }

    let distinct = column
        .valid_values()
        .map(|value| match value.as_str() {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(value.to_string()),
        })
        .collect::<HashSet<_>>()
        .len();

    Some(distinct as f64 / column.len() as f64)
}

/// Encode a text column as categorical column
/// if its distinct ratio is below [CATEGORICAL_RATIO_THRESHOLD].
pub fn categorize_column(column: Column) -> Column {
    let ColumnData::Text(values) = column.data() else {
        return column;
    };

    let Some(ratio) = distinct_ratio(&column) else {
        log::debug!("column {}: no rows, keeping text", column.name());
        return column;
    };

    if ratio >= CATEGORICAL_RATIO_THRESHOLD {
        log::debug!(
            "column {}: distinct ratio {ratio:.3}, keeping text",
            column.name()
        );
        return column;
    }

    let data = CategoricalData::encode(
        values
            .iter()
            .enumerate()
            .map(|(index, value)| column.is_valid(index).then_some(value.as_str())),
    );
    log::debug!(
        "column {}: distinct ratio {ratio:.3}, encoded {} categories",
        column.name(),
        data.categories().len()
    );

    column.replace_data(ColumnData::Categorical(data))
}

/// Observed minimum and maximum over the values of an integer column,
/// or `None` if the column is not an integer column or has no values.
pub fn integer_range(column: &Column) -> Option<(i128, i128)> {
    let values = column.data().integer_iter()?;

    values
        .enumerate()
        .filter(|(index, _)| column.is_valid(*index))
        .fold(None, |range, (_, value)| match range {
            None => Some((value, value)),
            Some((min, max)) => Some((value.min(min), value.max(max))),
        })
}

/// Store an integer column at the narrowest width able to hold its observed range.
///
/// The width depends only on the values, so a column may also be widened back
/// if its current type is too small for the chosen signedness.
/// Columns without values are stored as [`u8`].
pub fn downcast_integer_column(column: Column) -> Column {
    if !column.storage_type().is_integer() {
        return column;
    }

    let (min, max) = integer_range(&column).unwrap_or((0, 0));
    let target = StorageTypeName::smallest_integer_type(min, max);

    if target == column.storage_type() {
        return column;
    }

    log::debug!(
        "column {}: range [{min}, {max}], {} -> {target}",
        column.name(),
        column.storage_type()
    );

    let data = column
        .data()
        .integer_iter()
        .map(|values| ColumnData::from_integers(target, values));

    match data {
        Some(data) => column.replace_data(data),
        None => column,
    }
}

/// Store a [`f64`] column as [`f32`] if all of its values keep their decimal representation.
pub fn downcast_float_column(column: Column) -> Column {
    let ColumnData::Float64(values) = column.data() else {
        return column;
    };

    let fits = values
        .iter()
        .enumerate()
        .all(|(index, value)| !column.is_valid(index) || fits_f32(*value));

    if !fits {
        log::debug!("column {}: values need float64", column.name());
        return column;
    }

    log::debug!("column {}: float64 -> float32", column.name());
    let data = ColumnData::from_floats(StorageTypeName::Float32, values.iter().copied());

    column.replace_data(data)
}

/// Dictionary-encode every text column whose distinct ratio is below [CATEGORICAL_RATIO_THRESHOLD].
pub fn optimize_objects(table: Table) -> Table {
    table.map_columns(categorize_column)
}

/// Narrow every integer column to the smallest width that fits its values.
pub fn optimize_integers(table: Table) -> Table {
    table.map_columns(downcast_integer_column)
}

/// Narrow every [`f64`] column to [`f32`] where no decimal precision is lost.
pub fn optimize_floats(table: Table) -> Table {
    table.map_columns(downcast_float_column)
}

/// Apply all passes: categorical encoding, then integer and float narrowing.
pub fn optimize_all(table: Table) -> Table {
    let before = table.size_bytes();
    let table = optimize_floats(optimize_integers(optimize_objects(table)));
    log::debug!(
        "optimized table with {} rows: {before} -> {} bytes",
        table.row_count(),
        table.size_bytes()
    );

    table
}

/// Whether two columns hold the same logical values, ignoring their representation.
pub fn logically_equal(first: &Column, second: &Column) -> bool {
    first.len() == second.len()
        && first
            .values()
            .zip(second.values())
            .all(|(a, b)| cells_equal(a, b))
}

fn cells_equal(first: CellValue<'_>, second: CellValue<'_>) -> bool {
    match (first.as_i128(), second.as_i128()) {
        (Some(a), Some(b)) => return a == b,
        (None, None) => {}
        _ => return false,
    }

    match (first.as_f64(), second.as_f64()) {
        (Some(a), Some(b)) => a == b || (a.is_nan() && b.is_nan()),
        (None, None) => first == second,
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::{
        categorize_column, distinct_ratio, downcast_float_column, downcast_integer_column,
        logically_equal, optimize_all, optimize_objects,
    };
    use crate::{
        columnar::{Column, ColumnData},
        datatypes::{float::widen_f32, StorageTypeName},
        management::bytesized::ByteSized,
        tabular::Table,
    };
    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::from_text(
            name,
            values.iter().map(|value| value.map(String::from)).collect(),
        )
    }

    #[test]
    fn ratio_of_empty_column_is_undefined() {
        assert_eq!(distinct_ratio(&text("brand", &[])), None);
    }

    #[test]
    fn ratio_ignores_missing_values() {
        let column = text("brand", &[Some("a"), None, Some("a"), None]);
        assert_eq!(distinct_ratio(&column), Some(0.25));
    }

    #[test]
    fn low_cardinality_text_becomes_categorical() {
        let column = text(
            "event_type",
            &[Some("view"), Some("view"), Some("cart"), Some("view"), Some("view")],
        );
        let optimized = categorize_column(column.clone());

        assert_eq!(optimized.storage_type(), StorageTypeName::Categorical);
        assert!(logically_equal(&column, &optimized));
        assert!(optimized.size_bytes() < column.size_bytes());
    }

    #[test]
    fn threshold_is_strict() {
        let column = text("brand", &[Some("a"), Some("b"), Some("a"), Some("b")]);
        assert_eq!(distinct_ratio(&column), Some(0.5));
        assert_eq!(
            categorize_column(column).storage_type(),
            StorageTypeName::Text
        );

        let column = text("brand", &[Some("a"), Some("b"), Some("a"), Some("b"), Some("a")]);
        assert_eq!(
            categorize_column(column).storage_type(),
            StorageTypeName::Categorical
        );
    }

    #[test]
    fn categorical_keeps_missing_values() {
        let column = text("brand", &[Some("a"), None, Some("a"), None, Some("a")]);
        let optimized = categorize_column(column.clone());

        assert_eq!(optimized.storage_type(), StorageTypeName::Categorical);
        assert_eq!(optimized.null_count(), 2);
        assert!(logically_equal(&column, &optimized));
    }

    #[test]
    fn empty_table_stays_unchanged() {
        let table = Table::new(vec![text("brand", &[]), Column::from_i64("id", vec![])]).unwrap();
        let optimized = optimize_objects(table.clone());

        assert_eq!(optimized, table);
        assert_eq!(optimized.size_bytes(), 0);
    }

    #[test]
    fn integers_use_smallest_width() {
        let unsigned = Column::from_i64("category_id", vec![Some(0), Some(200), None]);
        let optimized = downcast_integer_column(unsigned.clone());
        assert_eq!(optimized.storage_type(), StorageTypeName::UInt8);
        assert!(logically_equal(&unsigned, &optimized));

        let signed = Column::from_i64("delta", vec![Some(-129), Some(5)]);
        assert_eq!(
            downcast_integer_column(signed).storage_type(),
            StorageTypeName::Int16
        );

        let large = Column::from_i64("user_id", vec![Some(5_000_000_000)]);
        assert_eq!(
            downcast_integer_column(large).storage_type(),
            StorageTypeName::UInt64
        );
    }

    #[test]
    fn integer_type_follows_range_not_current_type() {
        let column = Column::new("id", ColumnData::Int8(vec![1, 2, 3]));
        assert_eq!(
            downcast_integer_column(column).storage_type(),
            StorageTypeName::UInt8
        );
    }

    #[test]
    fn floats_keep_decimal_precision() {
        let prices = Column::from_f64("price", vec![Some(12.34), Some(0.99), None]);
        let optimized = downcast_float_column(prices.clone());
        assert_eq!(optimized.storage_type(), StorageTypeName::Float32);
        assert!(logically_equal(&prices, &optimized));

        let precise = Column::from_f64("ratio", vec![Some(0.5), Some(0.123456789012)]);
        assert_eq!(
            downcast_float_column(precise).storage_type(),
            StorageTypeName::Float64
        );
    }

    #[test]
    fn passes_ignore_other_types() {
        let column = text("brand", &[Some("a"), Some("a"), Some("a")]);
        assert_eq!(downcast_integer_column(column.clone()), column);
        assert_eq!(downcast_float_column(column.clone()), column);

        let column = Column::from_i64("id", vec![Some(1), Some(1), Some(1)]);
        assert_eq!(categorize_column(column.clone()), column);
    }

    #[test]
    fn optimize_all_preserves_rows_and_columns() {
        let table = Table::new(vec![
            text("event_type", &[Some("view"), Some("view"), Some("cart"), Some("view")]),
            Column::from_i64("product_id", vec![Some(1), Some(2), None, Some(4)]),
            Column::from_f64("price", vec![Some(1.25), Some(3.5), Some(3.5), None]),
        ])
        .unwrap();
        let optimized = optimize_all(table.clone());

        assert_eq!(optimized.row_count(), table.row_count());
        assert_eq!(optimized.column_names(), table.column_names());
        for (before, after) in table.columns().iter().zip(optimized.columns()) {
            assert!(logically_equal(before, after));
        }
        assert!(optimized.size_bytes() < table.size_bytes());
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn integer_downcast_is_lossless(values: Vec<Option<i64>>) -> bool {
        let column = Column::from_i64("values", values.clone());
        let optimized = downcast_integer_column(column);

        let widened = optimized
            .values()
            .map(|value| value.as_i128().map(|v| v as i64))
            .collect::<Vec<_>>();

        let original_size = Column::from_i64("values", values.clone()).size_bytes();
        widened == values && optimized.size_bytes() <= original_size
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn float_downcast_error_is_bounded(values: Vec<f64>) -> bool {
        let column = Column::from_f64("values", values.iter().copied().map(Some).collect());
        let before = column.size_bytes();
        let optimized = downcast_float_column(column);

        let within_precision = match optimized.data() {
            ColumnData::Float32(narrowed) => {
                narrowed.iter().zip(&values).all(|(narrow, original)| {
                    original.is_nan() || widen_f32(*narrow) == *original
                })
            }
            ColumnData::Float64(kept) => kept
                .iter()
                .zip(&values)
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan())),
            _ => false,
        };

        within_precision && optimized.size_bytes() <= before
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn categorical_encoding_is_lossless(values: Vec<Option<u8>>) -> bool {
        let column = Column::from_text(
            "values",
            values.iter().map(|value| value.map(|v| (v % 4).to_string())).collect(),
        );
        let optimized = categorize_column(column.clone());

        logically_equal(&column, &optimized)
    }
}
