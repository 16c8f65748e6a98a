//! Aggregates shown by the charts

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use itertools::Itertools;

use tabslim_physical::columnar::Column;

const SECONDS_PER_DAY: i64 = 86_400;

/// Number of events on a single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    /// The day (UTC)
    pub day: NaiveDate,
    /// Number of rows with an event on this day
    pub count: u64,
}

/// Count the rows per calendar day of `times` for which `events` holds a value.
///
/// `times` is expected to be a date-time column; rows without a time are skipped.
/// Days between the first and the last day without any event are included with a count of 0.
pub fn daily_event_counts(times: &Column, events: &Column) -> Vec<DailyCount> {
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();

    for row in 0..times.len() {
        let Some(seconds) = times.value(row).as_timestamp() else {
            continue;
        };

        let count = counts.entry(seconds.div_euclid(SECONDS_PER_DAY)).or_insert(0);
        if events.is_valid(row) {
            *count += 1;
        }
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    (first..=last)
        .filter_map(|day| {
            let date = DateTime::from_timestamp(day * SECONDS_PER_DAY, 0)?.date_naive();
            Some(DailyCount {
                day: date,
                count: counts.get(&day).copied().unwrap_or(0),
            })
        })
        .collect()
}

/// Occurrences of every distinct present value, most frequent first.
///
/// Values with equal counts are ordered by their text.
pub fn value_counts(column: &Column) -> Vec<(String, u64)> {
    column
        .valid_values()
        .map(|value| value.to_string())
        .counts()
        .into_iter()
        .map(|(value, count)| (value, count as u64))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// The `limit` most frequent values of the column.
pub fn top_values(column: &Column, limit: usize) -> Vec<(String, u64)> {
    let mut counts = value_counts(column);
    counts.truncate(limit);
    counts
}

/// Share of each count in the sum of all counts, in percent.
pub fn percentages(counts: &[(String, u64)]) -> Vec<f64> {
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    counts
        .iter()
        .map(|(_, count)| *count as f64 / total as f64 * 100.0)
        .collect()
}

/// Numeric view on a column; values that are missing or not numeric are `None`.
pub fn numeric_values(column: &Column) -> Vec<Option<f64>> {
    column
        .values()
        .map(|value| value.as_f64().filter(|v| !v.is_nan()))
        .collect()
}

/// Pearson correlation over the rows where both inputs have a value.
///
/// Returns `None` if fewer than two such rows exist or one side is constant.
pub fn pearson_correlation(first: &[Option<f64>], second: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = first
        .iter()
        .zip(second)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let count = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / count;

    let (mut sum_xy, mut sum_xx, mut sum_yy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    if sum_xx == 0.0 || sum_yy == 0.0 {
        return None;
    }

    Some((sum_xy / (sum_xx.sqrt() * sum_yy.sqrt())).clamp(-1.0, 1.0))
}

/// Pairwise correlations of the given columns, indexed `[row][column]`.
pub fn correlation_matrix(columns: &[&Column]) -> Vec<Vec<Option<f64>>> {
    let values: Vec<Vec<Option<f64>>> = columns.iter().map(|c| numeric_values(c)).collect();

    values
        .iter()
        .map(|first| {
            values
                .iter()
                .map(|second| pearson_correlation(first, second))
                .collect()
        })
        .collect()
}

/// Counts of values in equally wide bins
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin boundaries, one more than there are bins
    pub edges: Vec<f64>,
    /// Number of values per bin
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Number of bins
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Bins as `(start, end, count)`
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .iter()
            .tuple_windows()
            .zip(&self.counts)
            .map(|((start, end), count)| (*start, *end, *count))
    }
}

/// Sort the finite values into `bins` equally wide bins between their minimum and maximum.
///
/// Every bin is half-open except for the last, which also holds the maximum.
/// If all values are equal, the bins cover `[v - 0.5, v + 0.5]`;
/// without any values they cover `[0, 1]`.
pub fn histogram(values: impl IntoIterator<Item = f64>, bins: usize) -> Histogram {
    let bins = bins.max(1);
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();

    let (mut low, mut high) = match values.iter().copied().minmax() {
        itertools::MinMaxResult::NoElements => (0.0, 1.0),
        itertools::MinMaxResult::OneElement(value) => (value, value),
        itertools::MinMaxResult::MinMax(min, max) => (min, max),
    };
    if low == high {
        low -= 0.5;
        high += 0.5;
    }

    let width = (high - low) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| low + width * i as f64).collect();
    edges.push(high);

    let mut counts = vec![0u64; bins];
    for value in values {
        let index = ((value - low) / width) as usize;
        counts[index.min(bins - 1)] += 1;
    }

    Histogram { edges, counts }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use quickcheck_macros::quickcheck;
    use test_log::test;

    use tabslim_physical::columnar::Column;

    use super::{
        correlation_matrix, daily_event_counts, histogram, pearson_correlation, percentages,
        top_values, value_counts, DailyCount,
    };

    fn text(name: &str, values: &[Option<&str>]) -> Column {
        Column::from_text(
            name,
            values.iter().map(|v| v.map(str::to_string)).collect(),
        )
    }

    #[test]
    fn daily_counts_fill_gaps() {
        let times = text(
            "event_time",
            &[
                Some("2019-12-01 10:00:00 UTC"),
                Some("2019-12-01 23:59:59 UTC"),
                Some("2019-12-03 00:00:00 UTC"),
                None,
                Some("2019-12-03 08:00:00 UTC"),
            ],
        )
        .to_datetime()
        .unwrap();
        let events = text(
            "event_type",
            &[Some("view"), Some("cart"), Some("view"), Some("view"), None],
        );

        let day = |d| NaiveDate::from_ymd_opt(2019, 12, d).unwrap();
        assert_eq!(
            daily_event_counts(&times, &events),
            vec![
                DailyCount {
                    day: day(1),
                    count: 2
                },
                DailyCount {
                    day: day(2),
                    count: 0
                },
                DailyCount {
                    day: day(3),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn daily_counts_of_empty_column() {
        let times = text("event_time", &[]).to_datetime().unwrap();
        let events = text("event_type", &[]);
        assert!(daily_event_counts(&times, &events).is_empty());
    }

    #[test]
    fn counts_are_sorted_descending() {
        let column = text(
            "event_type",
            &[
                Some("view"),
                Some("cart"),
                Some("view"),
                None,
                Some("purchase"),
                Some("view"),
                Some("cart"),
            ],
        );

        assert_eq!(
            value_counts(&column),
            vec![
                ("view".to_string(), 3),
                ("cart".to_string(), 2),
                ("purchase".to_string(), 1)
            ]
        );
        assert_eq!(top_values(&column, 2).len(), 2);
    }

    #[test]
    fn percentages_relative_to_shown_slices() {
        let counts = vec![("a".to_string(), 3), ("b".to_string(), 1)];
        assert_eq!(percentages(&counts), vec![75.0, 25.0]);
        assert_eq!(percentages(&[("a".to_string(), 0)]), vec![0.0]);
    }

    #[test]
    fn correlation_of_linear_data() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        let z = [Some(3.0), Some(2.0), Some(1.0), Some(0.0)];

        assert!((pearson_correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&x, &z).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson_correlation(&[Some(1.0), Some(1.0)], &[Some(1.0), Some(2.0)]), None);
        assert_eq!(pearson_correlation(&[Some(1.0)], &[Some(1.0)]), None);
    }

    #[test]
    fn correlation_matrix_is_symmetric() {
        let price = Column::from_f64("price", vec![Some(1.0), Some(2.5), Some(0.5), Some(4.0)]);
        let id = Column::from_i64("id", vec![Some(10), Some(7), Some(3), None]);

        let matrix = correlation_matrix(&[&price, &id]);
        assert_eq!(matrix.len(), 2);
        assert!((matrix[0][0].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix[0][1], matrix[1][0]);
    }

    #[test]
    fn histogram_bins() {
        let hist = histogram((0..=10).map(f64::from), 5);

        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(hist.counts, vec![2, 2, 2, 2, 3]);
        assert_eq!(hist.counts.iter().sum::<u64>(), 11);
    }

    #[test]
    fn histogram_of_constant_values() {
        let hist = histogram(vec![3.0, 3.0, f64::NAN], 20);

        assert_eq!(hist.bins(), 20);
        assert_eq!(hist.edges[0], 2.5);
        assert_eq!(hist.edges[20], 3.5);
        assert_eq!(hist.counts.iter().sum::<u64>(), 2);
        assert_eq!(hist.counts.iter().filter(|&&count| count > 0).count(), 1);
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn histogram_counts_every_finite_value(values: Vec<f64>, bins: u8) -> bool {
        let finite = values.iter().filter(|v| v.is_finite()).count() as u64;
        let hist = histogram(values, usize::from(bins));

        hist.bins() == usize::from(bins).max(1) && hist.counts.iter().sum::<u64>() == finite
    }
}
