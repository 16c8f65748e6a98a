//! Drawing of the charts as SVG files

use std::{error::Error, f64::consts::PI, path::Path};

use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::statistics::{DailyCount, Histogram};

type DrawResult = Result<(), Box<dyn Error>>;

const FONT: &str = "sans-serif";
const CAPTION_SIZE: f64 = 28.0;
const LABEL_SIZE: f64 = 15.0;

pub(super) const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
pub(super) const ORANGE: RGBColor = RGBColor(255, 165, 0);
const LINE_BLUE: RGBColor = RGBColor(31, 119, 180);

/// Upper end of a count axis, leaving some room above the highest value
fn count_axis_end(max: u64) -> f64 {
    (max.max(1) as f64 * 1.1).ceil()
}

fn centered(size: f64) -> TextStyle<'static> {
    TextStyle::from((FONT, size).into_font()).pos(Pos::new(HPos::Center, VPos::Center))
}

/// Category slot `i` is centered on `i`; other axis positions carry no label.
fn slot_index(position: f64, slots: usize) -> Option<usize> {
    let index = position.round();
    if (position - index).abs() > 1e-9 || index < 0.0 || index >= slots as f64 {
        return None;
    }
    Some(index as usize)
}

/// Axis range holding `slots` unit-wide slots centered on `0..slots`
fn slot_range(slots: usize) -> std::ops::Range<f64> {
    -0.5..slots.max(1) as f64 - 0.5
}

pub(super) fn line_chart(path: &Path, title: &str, y_label: &str, points: &[DailyCount]) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_end = points.len().max(2) as f64 - 1.0;
    let y_end = count_axis_end(points.iter().map(|p| p.count).max().unwrap_or(0));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_end, 0.0..y_end)?;

    let day_label = |position: &f64| {
        slot_index(*position, points.len())
            .map(|index| points[index].day.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_labels(points.len().clamp(2, 10))
        .x_label_formatter(&day_label)
        .y_label_formatter(&|count| format!("{count:.0}"))
        .x_desc("Date")
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(LineSeries::new(
        points
            .iter()
            .enumerate()
            .map(|(index, point)| (index as f64, point.count as f64)),
        LINE_BLUE.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

pub(super) fn bar_chart(
    path: &Path,
    title: &str,
    y_label: &str,
    counts: &[(String, u64)],
    color: RGBColor,
) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = counts.len().max(1);
    let y_end = count_axis_end(counts.iter().map(|(_, count)| *count).max().unwrap_or(0));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(slot_range(slots), 0.0..y_end)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&|position| {
            slot_index(*position, counts.len())
                .map(|index| counts[index].0.clone())
                .unwrap_or_default()
        })
        .y_label_formatter(&|count| format!("{count:.0}"))
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(index, (_, count))| {
        let center = index as f64;
        Rectangle::new(
            [(center - 0.4, 0.0), (center + 0.4, *count as f64)],
            color.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn polar(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 - (radius * angle.sin()).round() as i32,
    )
}

/// Pie chart starting at three o'clock and running counterclockwise.
pub(super) fn pie_chart(
    path: &Path,
    title: &str,
    slices: &[(String, u64)],
    percentages: &[f64],
) -> DrawResult {
    let root = SVGBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, (FONT, CAPTION_SIZE).into_font())?;

    let (width, height) = root.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;
    let total: u64 = slices.iter().map(|(_, count)| count).sum();

    if total > 0 {
        let mut start = 0.0;
        for (index, ((label, count), percentage)) in slices.iter().zip(percentages).enumerate() {
            let sweep = 2.0 * PI * *count as f64 / total as f64;
            let steps = (sweep.to_degrees().ceil() as usize).max(1);

            let mut outline = Vec::with_capacity(steps + 2);
            outline.push(center);
            outline.extend(
                (0..=steps).map(|step| polar(center, radius, start + sweep * step as f64 / steps as f64)),
            );
            root.draw(&Polygon::new(outline, Palette99::pick(index).filled()))?;

            let middle = start + sweep / 2.0;
            root.draw(&Text::new(
                label.clone(),
                polar(center, radius * 1.15, middle),
                centered(LABEL_SIZE),
            ))?;
            root.draw(&Text::new(
                format!("{percentage:.1}%"),
                polar(center, radius * 0.6, middle),
                centered(LABEL_SIZE),
            ))?;

            start += sweep;
        }
    }

    root.present()?;
    Ok(())
}

/// Diverging blue to red color for values in `[-1, 1]`
pub(super) fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let value = value.clamp(-1.0, 1.0);
    let (from, to, t) = if value < 0.0 {
        (NEUTRAL, COLD, -value)
    } else {
        (NEUTRAL, WARM, value)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;

    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Annotated heatmap of a square matrix; row 0 is drawn at the top.
pub(super) fn heatmap(
    path: &Path,
    title: &str,
    labels: &[String],
    matrix: &[Vec<Option<f64>>],
) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let size = labels.len().max(1);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(120)
        .build_cartesian_2d(slot_range(size), slot_range(size))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(size)
        .y_labels(size)
        .x_label_formatter(&|position| {
            slot_index(*position, labels.len())
                .map(|index| labels[index].clone())
                .unwrap_or_default()
        })
        .y_label_formatter(&|position| {
            slot_index(*position, labels.len())
                .map(|index| labels[labels.len() - 1 - index].clone())
                .unwrap_or_default()
        })
        .draw()?;

    let cells: Vec<(f64, f64, Option<f64>)> = matrix
        .iter()
        .enumerate()
        .flat_map(|(row, values)| {
            values.iter().enumerate().map(move |(column, value)| {
                (column as f64, (size - 1 - row) as f64, *value)
            })
        })
        .collect();

    chart.draw_series(cells.iter().map(|(x, y, value)| {
        let color = value.map_or(WHITE, coolwarm);
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
    }))?;

    chart.draw_series(cells.iter().map(|(x, y, value)| {
        let (text, color): (String, &'static RGBColor) = match value {
            Some(value) if value.abs() > 0.6 => (format!("{value:.2}"), &WHITE),
            Some(value) => (format!("{value:.2}"), &BLACK),
            None => ("nan".to_string(), &BLACK),
        };
        Text::new(text, (*x, *y), centered(LABEL_SIZE + 3.0).color(color))
    }))?;

    root.present()?;
    Ok(())
}

pub(super) fn histogram_chart(
    path: &Path,
    title: &str,
    x_label: &str,
    y_label: &str,
    histogram: &Histogram,
    color: RGBColor,
) -> DrawResult {
    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let low = histogram.edges.first().copied().unwrap_or(0.0);
    let high = histogram.edges.last().copied().unwrap_or(1.0);
    let y_end = count_axis_end(histogram.counts.iter().copied().max().unwrap_or(0));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(low..high, 0.0..y_end)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_label_formatter(&|count| format!("{count:.0}"))
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()?;

    chart.draw_series(histogram.iter().map(|(start, end, count)| {
        Rectangle::new([(start, 0.0), (end, count as f64)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}
