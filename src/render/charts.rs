//! Cross-dataset summary charts drawn with plotters into an in-memory RGB buffer.

use anyhow::{anyhow, Result};
use image::RgbImage;
use plotters::prelude::*;
use std::ops::Range;

/// Dataset colours, cycled: gray, tab:blue, tab:orange, tab:green, tab:red.
const PALETTE: [RGBColor; 5] = [
    RGBColor(128, 128, 128),
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

const MARKER_RADIUS: i32 = 4;
const SWARM_HEIGHT: u32 = 500;
const SCATTER_SIZE: (u32, u32) = (560, 460);

fn plot_error<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("failed to draw chart: {}", e)
}

/// Finite min/max of `values` padded by 5%, or `0..1` without data.
fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !min.is_finite() {
        return 0.0..1.0;
    }
    let pad = if max - min > 1e-9 { (max - min) * 0.05 } else { 1.0 };
    (min - pad)..(max + pad)
}

/// Horizontal offsets for a beeswarm column: each point takes the smallest
/// offset that keeps it `spacing` pixels away from every point already placed.
fn swarm_offsets(ys: &[f64], spacing: f64, max_offset: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..ys.len()).collect();
    order.sort_by(|&a, &b| ys[a].total_cmp(&ys[b]));

    let mut offsets = vec![0.0; ys.len()];
    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(ys.len());
    for idx in order {
        let y = ys[idx];
        let mut k = 0usize;
        let offset = loop {
            let step = k.div_ceil(2) as f64 * spacing;
            if step > max_offset {
                break 0.0;
            }
            let candidate = if k % 2 == 1 { step } else { -step };
            let free = placed
                .iter()
                .all(|&(px, py)| (px - candidate).powi(2) + (py - y).powi(2) >= spacing * spacing);
            if free {
                break candidate;
            }
            k += 1;
        };
        offsets[idx] = offset;
        placed.push((offset, y));
    }
    offsets
}

fn into_image(width: u32, height: u32, rgb: Vec<u8>) -> Result<RgbImage> {
    RgbImage::from_raw(width, height, rgb).ok_or_else(|| anyhow!("chart buffer has the wrong size"))
}

/// One column of points per dataset with a black bar at the mean.
pub fn swarm_plot(names: &[String], groups: &[Vec<f64>], y_desc: &str) -> Result<RgbImage> {
    let columns = groups.len().max(1);
    let (width, height) = (100 + 150 * columns as u32, SWARM_HEIGHT);
    let mut rgb = vec![255u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let y_range = value_range(groups.iter().flatten());
        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..columns as f64 - 0.5, y_range.clone())
            .map_err(plot_error)?;

        let label_for = |x: &f64| {
            let i = x.round();
            if (x - i).abs() < 1e-6 && i >= 0.0 {
                names.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_labels(columns)
            .x_label_formatter(&label_for)
            .y_desc(y_desc)
            .draw()
            .map_err(plot_error)?;

        // Pixels per category, to turn pixel offsets back into chart units.
        let px_per_column = (chart.backend_coord(&(1.0, y_range.start)).0
            - chart.backend_coord(&(0.0, y_range.start)).0)
            .max(1) as f64;

        for (i, values) in groups.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
            let ys_px: Vec<f64> = finite
                .iter()
                .map(|&v| chart.backend_coord(&(i as f64, v)).1 as f64)
                .collect();
            let offsets = swarm_offsets(
                &ys_px,
                2.0 * MARKER_RADIUS as f64 + 1.0,
                px_per_column * 0.45,
            );

            chart
                .draw_series(finite.iter().zip(offsets).map(|(&v, dx)| {
                    Circle::new((i as f64 + dx / px_per_column, v), MARKER_RADIUS, color.filled())
                }))
                .map_err(plot_error)?;

            let mean = crate::statistics::mean(&finite);
            if mean.is_finite() {
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![(i as f64 - 0.125, mean), (i as f64 + 0.125, mean)],
                        BLACK.stroke_width(3),
                    )))
                    .map_err(plot_error)?;
            }
        }

        root.present().map_err(plot_error)?;
    }

    into_image(width, height, rgb)
}

/// Major vs minor length, one marker style per dataset.
pub fn scatter_plot(names: &[String], majors: &[Vec<f64>], minors: &[Vec<f64>]) -> Result<RgbImage> {
    let (width, height) = SCATTER_SIZE;
    let mut rgb = vec![255u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(
                value_range(majors.iter().flatten()),
                value_range(minors.iter().flatten()),
            )
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Major axis (um)")
            .y_desc("Minor axis (um)")
            .draw()
            .map_err(plot_error)?;

        // First dataset solid black, second white with a blue rim.
        let style = |i: usize| match i {
            0 => (BLACK, BLACK),
            1 => (WHITE, PALETTE[1]),
            _ => (PALETTE[i % PALETTE.len()], BLACK),
        };

        for (i, (xs, ys)) in majors.iter().zip(minors).enumerate() {
            let (fill, edge) = style(i);
            let points: Vec<(f64, f64)> = xs
                .iter()
                .zip(ys)
                .map(|(&x, &y)| (x, y))
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect();

            let series = chart
                .draw_series(points.iter().map(|&p| Circle::new(p, MARKER_RADIUS, fill.filled())))
                .map_err(plot_error)?;
            if let Some(name) = names.get(i) {
                series
                    .label(name.as_str())
                    .legend(move |(x, y)| Circle::new((x, y), MARKER_RADIUS, fill.filled()));
            }
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, MARKER_RADIUS, edge.stroke_width(1))))
                .map_err(plot_error)?;
        }

        if !names.is_empty() {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(plot_error)?;
        }

        root.present().map_err(plot_error)?;
    }

    into_image(width, height, rgb)
}
