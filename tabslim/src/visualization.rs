//! Descriptive charts of the optimized subset
//!
//! Every chart is written as an SVG file into a common directory.
//! The numbers behind the charts are computed in [statistics].

pub mod statistics;

mod charts;

use std::path::{Path, PathBuf};

use tabslim_physical::tabular::Table;

use crate::{config::ChartColumns, error::Error};

use self::statistics::{
    correlation_matrix, daily_event_counts, histogram, percentages, top_values, value_counts,
};

/// File name of the events-per-day chart
pub const EVENTS_OVER_TIME: &str = "events_over_time.svg";
/// File name of the event type chart
pub const EVENT_TYPE_DISTRIBUTION: &str = "event_type_distribution.svg";
/// File name of the pie chart
pub const TOP_CATEGORIES: &str = "top_10_brands.svg";
/// File name of the correlation heatmap
pub const CORRELATION_MATRIX: &str = "correlation_matrix.svg";
/// File name of the histogram
pub const DISTRIBUTION: &str = "price_distribution.svg";

/// Number of slices in the pie chart
pub const TOP_CATEGORY_COUNT: usize = 10;
/// Number of bins in the histogram
pub const HISTOGRAM_BINS: usize = 20;

fn rendering_error(path: &Path) -> impl FnOnce(Box<dyn std::error::Error>) -> Error + '_ {
    move |error| Error::Rendering {
        chart: path.display().to_string(),
        message: error.to_string(),
    }
}

fn prepare(output_dir: &Path, file: &str) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(output_dir).map_err(|error| Error::WriteFailure {
        error,
        filename: output_dir.display().to_string(),
    })?;
    Ok(output_dir.join(file))
}

/// Line chart of the number of events per day.
pub fn plot_events_over_time(
    table: &Table,
    columns: &ChartColumns,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let times = table.try_column(&columns.time_column)?.clone().to_datetime()?;
    let events = table.try_column(&columns.event_type_column)?;
    let counts = daily_event_counts(&times, events);
    log::debug!("events over time: {} days", counts.len());

    let path = prepare(output_dir, EVENTS_OVER_TIME)?;
    charts::line_chart(&path, "Events over time", "Number of events", &counts)
        .map_err(rendering_error(&path))?;

    Ok(path)
}

/// Bar chart of the frequency of each event type.
pub fn plot_event_type_distribution(
    table: &Table,
    columns: &ChartColumns,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let counts = value_counts(table.try_column(&columns.event_type_column)?);
    log::debug!("event type distribution: {} distinct values", counts.len());

    let path = prepare(output_dir, EVENT_TYPE_DISTRIBUTION)?;
    charts::bar_chart(
        &path,
        "Distribution of event types",
        "Count",
        &counts,
        charts::SKY_BLUE,
    )
    .map_err(rendering_error(&path))?;

    Ok(path)
}

/// Pie chart of the ten most frequent values of the category column.
pub fn plot_top_categories(
    table: &Table,
    columns: &ChartColumns,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let slices = top_values(
        table.try_column(&columns.category_column)?,
        TOP_CATEGORY_COUNT,
    );
    let shares = percentages(&slices);

    let path = prepare(output_dir, TOP_CATEGORIES)?;
    charts::pie_chart(
        &path,
        &format!("Top {TOP_CATEGORY_COUNT} {} by occurrence", columns.category_column),
        &slices,
        &shares,
    )
    .map_err(rendering_error(&path))?;

    Ok(path)
}

/// Heatmap of the pairwise correlations of the numeric columns.
pub fn plot_correlation_matrix(
    table: &Table,
    columns: &ChartColumns,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let selected = columns
        .correlation_columns
        .iter()
        .map(|name| table.try_column(name))
        .collect::<Result<Vec<_>, _>>()?;
    let matrix = correlation_matrix(&selected);

    let path = prepare(output_dir, CORRELATION_MATRIX)?;
    charts::heatmap(
        &path,
        "Correlation matrix",
        &columns.correlation_columns,
        &matrix,
    )
    .map_err(rendering_error(&path))?;

    Ok(path)
}

/// Histogram of the values of a numeric column.
pub fn plot_distribution(
    table: &Table,
    columns: &ChartColumns,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let column = table.try_column(&columns.histogram_column)?;
    let bins = histogram(
        column.valid_values().filter_map(|value| value.as_f64()),
        HISTOGRAM_BINS,
    );

    let path = prepare(output_dir, DISTRIBUTION)?;
    charts::histogram_chart(
        &path,
        &format!("Distribution of {}", columns.histogram_column),
        &columns.histogram_column,
        "Frequency",
        &bins,
        charts::ORANGE,
    )
    .map_err(rendering_error(&path))?;

    Ok(path)
}

/// Draw all five charts, returning the written files.
pub fn render_all(
    table: &Table,
    columns: &ChartColumns,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, Error> {
    let charts = vec![
        plot_events_over_time(table, columns, output_dir)?,
        plot_event_type_distribution(table, columns, output_dir)?,
        plot_top_categories(table, columns, output_dir)?,
        plot_correlation_matrix(table, columns, output_dir)?,
        plot_distribution(table, columns, output_dir)?,
    ];
    log::info!(
        "wrote {} charts to \"{}\"",
        charts.len(),
        output_dir.display()
    );

    Ok(charts)
}

#[cfg(test)]
mod test {
    use assert_fs::{prelude::*, TempDir};
    use test_log::test;

    use tabslim_physical::{columnar::Column, tabular::Table};

    use super::{plot_events_over_time, render_all};
    use crate::{config::ChartColumns, error::Error};

    fn text(name: &str, values: &[&str]) -> Column {
        Column::from_text(name, values.iter().map(|v| Some(v.to_string())).collect())
    }

    fn subset() -> Table {
        Table::new(vec![
            text(
                "event_time",
                &[
                    "2019-12-01 00:00:00 UTC",
                    "2019-12-01 05:00:00 UTC",
                    "2019-12-02 00:00:00 UTC",
                    "2019-12-04 12:00:00 UTC",
                ],
            ),
            text("event_type", &["view", "view", "cart", "purchase"]),
            Column::from_i64("product_id", vec![Some(1), Some(2), Some(3), Some(4)]),
            Column::from_i64("category_id", vec![Some(9), Some(9), Some(7), Some(1)]),
            text("brand", &["apple", "apple", "samsung", "xiaomi"]),
            Column::from_f64("price", vec![Some(9.99), Some(12.5), None, Some(100.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn renders_five_svg_files() {
        let dir = TempDir::new().unwrap();
        let graphics = dir.child("Graphics");

        let charts = render_all(&subset(), &ChartColumns::default(), graphics.path()).unwrap();
        assert_eq!(charts.len(), 5);

        for name in [
            "events_over_time.svg",
            "event_type_distribution.svg",
            "top_10_brands.svg",
            "correlation_matrix.svg",
            "price_distribution.svg",
        ] {
            graphics
                .child(name)
                .assert(predicates::str::contains("<svg"));
        }
    }

    #[test]
    fn renders_empty_subset() {
        let dir = TempDir::new().unwrap();
        let empty = Table::new(
            ["event_time", "event_type", "product_id", "category_id", "brand", "price"]
                .iter()
                .map(|name| Column::from_text(*name, vec![]))
                .collect(),
        )
        .unwrap();

        let charts = render_all(&empty, &ChartColumns::default(), dir.path()).unwrap();
        assert_eq!(charts.len(), 5);
    }

    #[test]
    fn missing_chart_column() {
        let dir = TempDir::new().unwrap();
        let columns = ChartColumns {
            time_column: "timestamp".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            plot_events_over_time(&subset(), &columns, dir.path()),
            Err(Error::Physical(_))
        ));
    }

    #[test]
    fn unparsable_time_column() {
        let dir = TempDir::new().unwrap();
        let columns = ChartColumns {
            time_column: "brand".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            plot_events_over_time(&subset(), &columns, dir.path()),
            Err(Error::Physical(_))
        ));
    }
}
