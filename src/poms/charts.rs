// Chart rendering with plotters. Every chart is written as a standalone
// SVG file; radar and bar plot the per-scale means, box and scatter plot
// the individual scores.

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::poms::*;

const CHART_SIZE: (u32, u32) = (900, 600);

fn chart_err<E: std::fmt::Display>(path: &str, e: E) -> PomsError {
    PomsError::Chart {
        path: path.to_string(),
        message: e.to_string(),
    }
}

/// Renders the selected chart for the selected score columns.
///
/// An empty result table or an empty selection renders nothing and
/// succeeds: there is no data worth a file.
pub fn render_chart(
    path: &str,
    kind: ChartKind,
    columns: &[ScoreColumn],
    rows: &[ResultRow],
) -> PomsResult<()> {
    if rows.is_empty() || columns.is_empty() {
        info!("Nothing to plot (no rows or no scales selected), skipping the chart output");
        return Ok(());
    }

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_err(path, e))?;

    match kind {
        ChartKind::RadarMean => draw_radar(&root, columns, rows, path),
        ChartKind::BarMean => draw_bar(&root, columns, rows, path),
        ChartKind::BoxIndividual => draw_box(&root, columns, rows, path),
        ChartKind::ScatterIndividual => draw_scatter(&root, columns, rows, path),
    }?;

    root.present().map_err(|e| chart_err(path, e))?;
    info!("Wrote the {:?} chart to {}", kind, path);
    Ok(())
}

// The vertical range shared by the individual-score charts, padded so the
// extreme points do not sit on the frame.
fn score_range(columns: &[ScoreColumn], rows: &[ResultRow]) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for row in rows {
        for &column in columns {
            let score = row.column_score(column) as f32;
            min = min.min(score);
            max = max.max(score);
        }
    }
    let pad = ((max - min).abs() * 0.1).max(1.0);
    (min - pad, max + pad)
}

fn draw_bar(
    root: &DrawingArea<SVGBackend, Shift>,
    columns: &[ScoreColumn],
    rows: &[ResultRow],
    path: &str,
) -> PomsResult<()> {
    let means = mean_series(&melt(rows, columns));
    let n = means.len() as i32;
    let top = means
        .iter()
        .map(|(_, mean)| *mean as f32)
        .fold(f32::MIN, f32::max)
        .max(1.0)
        * 1.1;
    let bottom = means
        .iter()
        .map(|(_, mean)| *mean as f32)
        .fold(0.0f32, f32::min);

    let mut chart = ChartBuilder::on(root)
        .caption("Mean Scores Bar Chart", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), bottom..top)
        .map_err(|e| chart_err(path, e))?;

    let names: Vec<&'static str> = means.iter().map(|(column, _)| column.name()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => names
                .get(*idx as usize)
                .copied()
                .unwrap_or("")
                .to_string(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| chart_err(path, e))?;

    chart
        .draw_series(means.iter().enumerate().map(|(idx, (_, mean))| {
            let color = Palette99::pick(idx);
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(idx as i32), 0f32),
                    (SegmentValue::Exact(idx as i32 + 1), *mean as f32),
                ],
                color.filled(),
            );
            bar.set_margin(0, 0, 10, 10);
            bar
        }))
        .map_err(|e| chart_err(path, e))?;
    Ok(())
}

fn draw_box(
    root: &DrawingArea<SVGBackend, Shift>,
    columns: &[ScoreColumn],
    rows: &[ResultRow],
    path: &str,
) -> PomsResult<()> {
    let n = columns.len() as i32;
    let (bottom, top) = score_range(columns, rows);

    let mut chart = ChartBuilder::on(root)
        .caption("Individual Scores Distribution", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), bottom..top)
        .map_err(|e| chart_err(path, e))?;

    let names: Vec<&'static str> = columns.iter().map(|column| column.name()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => names
                .get(*idx as usize)
                .copied()
                .unwrap_or("")
                .to_string(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| chart_err(path, e))?;

    for (idx, &column) in columns.iter().enumerate() {
        let values: Vec<f64> = rows
            .iter()
            .map(|row| row.column_score(column) as f64)
            .collect();
        let quartiles = Quartiles::new(&values);
        let color = Palette99::pick(idx);

        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(idx as i32), &quartiles)
                    .width(24)
                    .whisker_width(0.5)
                    .style(&color),
            ))
            .map_err(|e| chart_err(path, e))?;

        // All the individual points, overlaid on the box.
        chart
            .draw_series(values.iter().map(|value| {
                Circle::new(
                    (SegmentValue::CenterOf(idx as i32), *value as f32),
                    3,
                    color.mix(0.5).filled(),
                )
            }))
            .map_err(|e| chart_err(path, e))?;
    }
    Ok(())
}

fn draw_scatter(
    root: &DrawingArea<SVGBackend, Shift>,
    columns: &[ScoreColumn],
    rows: &[ResultRow],
    path: &str,
) -> PomsResult<()> {
    let n = rows.len() as i32;
    let (bottom, top) = score_range(columns, rows);

    let mut chart = ChartBuilder::on(root)
        .caption("Individual Scores Scatter Plot", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), bottom..top)
        .map_err(|e| chart_err(path, e))?;

    let names: Vec<String> = rows.iter().map(|row| row.name.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => names
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(|e| chart_err(path, e))?;

    for (idx, &column) in columns.iter().enumerate() {
        let color = Palette99::pick(idx);
        chart
            .draw_series(rows.iter().enumerate().map(|(ridx, row)| {
                Circle::new(
                    (
                        SegmentValue::CenterOf(ridx as i32),
                        row.column_score(column) as f32,
                    ),
                    4,
                    color.filled(),
                )
            }))
            .map_err(|e| chart_err(path, e))?
            .label(column.name())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(|e| chart_err(path, e))?;
    Ok(())
}

fn draw_radar(
    root: &DrawingArea<SVGBackend, Shift>,
    columns: &[ScoreColumn],
    rows: &[ResultRow],
    path: &str,
) -> PomsResult<()> {
    let means = mean_series(&melt(rows, columns));
    let n = means.len();

    let mut chart = ChartBuilder::on(root)
        .caption("Mean Scores Radar Chart", ("sans-serif", 24))
        .margin(20)
        .build_cartesian_2d(-1.4f32..1.4f32, -1.25f32..1.25f32)
        .map_err(|e| chart_err(path, e))?;

    let angle = |idx: usize| -> f32 {
        std::f32::consts::FRAC_PI_2 - (idx as f32) * std::f32::consts::TAU / (n as f32)
    };
    let pos = |idx: usize, radius: f32| -> (f32, f32) {
        let a = angle(idx);
        (radius * a.cos(), radius * a.sin())
    };

    // Reference rings and one spoke per scale.
    for ring in [0.25f32, 0.5, 0.75, 1.0] {
        let ring_points: Vec<(f32, f32)> = (0..=n).map(|idx| pos(idx % n, ring)).collect();
        chart
            .draw_series(std::iter::once(PathElement::new(
                ring_points,
                &BLACK.mix(0.15),
            )))
            .map_err(|e| chart_err(path, e))?;
    }
    for (idx, (column, _)) in means.iter().enumerate() {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.0, 0.0), pos(idx, 1.0)],
                &BLACK.mix(0.15),
            )))
            .map_err(|e| chart_err(path, e))?;
        chart
            .draw_series(std::iter::once(Text::new(
                column.name().to_string(),
                pos(idx, 1.12),
                ("sans-serif", 14),
            )))
            .map_err(|e| chart_err(path, e))?;
    }

    // The mean polygon, normalized by the largest mean and closed by
    // repeating the first point. Negative means collapse to the center.
    let denom = means
        .iter()
        .map(|(_, mean)| *mean)
        .fold(f64::MIN, f64::max)
        .abs()
        .max(1.0);
    let mut polygon: Vec<(f32, f32)> = means
        .iter()
        .enumerate()
        .map(|(idx, (_, mean))| pos(idx, (*mean / denom).max(0.0) as f32))
        .collect();
    polygon.push(polygon[0]);

    chart
        .draw_series(std::iter::once(PathElement::new(
            polygon.clone(),
            BLUE.stroke_width(2),
        )))
        .map_err(|e| chart_err(path, e))?;
    chart
        .draw_series(
            polygon
                .iter()
                .take(n)
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(|e| chart_err(path, e))?;
    Ok(())
}
