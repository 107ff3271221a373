//! Figures: per-image mask and axis overlays, and the cross-dataset swarm and
//! scatter plots. Everything here only consumes measurement values.

pub mod charts;

use crate::aggregate::{AnalysisSink, DatasetResult};
use crate::analysis::ImageAnalysis;
use crate::image_io::GrayImage;
use crate::morphology::Mask;
use charts::{scatter_plot, swarm_plot};
use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const MAGENTA: Rgb<u8> = Rgb([255, 0, 255]);

const REGION_TINT_ALPHA: f32 = 0.3;
const MARKER_RADIUS: i32 = 4;

pub fn mask_figure(mask: &Mask) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    ImageBuffer::from_fn(mask.width as u32, mask.height as u32, |x, y| {
        Luma([if mask.get(y as usize, x as usize) { 255 } else { 0 }])
    })
}

fn blend(base: Rgb<u8>, tint: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, t: u8| ((1.0 - alpha) * b as f32 + alpha * t as f32).round() as u8;
    Rgb([
        mix(base[0], tint[0]),
        mix(base[1], tint[1]),
        mix(base[2], tint[2]),
    ])
}

fn thick_line(img: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
        draw_line_segment_mut(img, (from.0 + dx, from.1 + dy), (to.0 + dx, to.1 + dy), color);
    }
}

/// Grayscale image with labeled regions tinted, and for every kept region its
/// bounding box, both half-axes and the centroid/endpoint markers.
pub fn axes_overlay(image: &GrayImage, analysis: &ImageAnalysis) -> RgbImage {
    let display = image.to_display_u8();
    let labels = &analysis.labels;
    let mut img = RgbImage::from_fn(image.width as u32, image.height as u32, |x, y| {
        let idx = y as usize * image.width + x as usize;
        let v = display[idx];
        let gray = Rgb([v, v, v]);
        if labels.labels[idx] > 0 {
            blend(gray, MAGENTA, REGION_TINT_ALPHA)
        } else {
            gray
        }
    });

    for (region, measurement) in analysis.kept.iter().zip(&analysis.measurements) {
        let bbox = region.bbox;
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(bbox.min_col as i32, bbox.min_row as i32)
                .of_size(bbox.width() as u32, bbox.height() as u32),
            BLUE,
        );

        let axes = measurement.axes;
        let c = (axes.centroid.x as f32, axes.centroid.y as f32);
        let minor = (axes.minor_end.x as f32, axes.minor_end.y as f32);
        let major = (axes.major_end.x as f32, axes.major_end.y as f32);
        thick_line(&mut img, c, minor, RED);
        thick_line(&mut img, c, major, RED);

        let point = |p: (f32, f32)| (p.0.round() as i32, p.1.round() as i32);
        draw_filled_circle_mut(&mut img, point(minor), MARKER_RADIUS, BLUE);
        draw_filled_circle_mut(&mut img, point(major), MARKER_RADIUS, WHITE);
        draw_filled_circle_mut(&mut img, point(c), MARKER_RADIUS, GREEN);
    }
    img
}

pub fn save_png(path: &Path, width: u32, height: u32, data: &[u8], color: ExtendedColorType) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(data, width, height, color)
        .with_context(|| format!("Failed to write PNG image to {}", path.display()))
}

fn save_rgb(path: &Path, img: &RgbImage) -> Result<()> {
    save_png(path, img.width(), img.height(), img.as_raw(), ExtendedColorType::Rgb8)
}

/// Writes `masks/` and `axes/` figures under `<output_dir>/<dataset>/`.
pub struct FigureWriter {
    output_dir: PathBuf,
}

impl FigureWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn figure_path(&self, dataset: &str, kind: &str, file: &str) -> PathBuf {
        let stem = Path::new(file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        self.output_dir.join(dataset).join(kind).join(format!("{}.png", stem))
    }
}

impl AnalysisSink for FigureWriter {
    fn image_analyzed(&self, dataset: &str, image: &GrayImage, analysis: &ImageAnalysis) -> Result<()> {
        let mask = mask_figure(&analysis.mask);
        save_png(
            &self.figure_path(dataset, "masks", &analysis.file),
            mask.width(),
            mask.height(),
            mask.as_raw(),
            ExtendedColorType::L8,
        )?;

        if !analysis.kept.is_empty() {
            let overlay = axes_overlay(image, analysis);
            save_rgb(&self.figure_path(dataset, "axes", &analysis.file), &overlay)?;
        }
        Ok(())
    }
}

/// Swarm plots for each axis and the major/minor scatter plot.
pub fn write_summary_plots(output_dir: &Path, results: &[DatasetResult]) -> Result<Vec<PathBuf>> {
    let names: Vec<String> = results.iter().map(|r| r.name.clone()).collect();
    let majors: Vec<Vec<f64>> = results.iter().map(|r| r.major_lengths()).collect();
    let minors: Vec<Vec<f64>> = results.iter().map(|r| r.minor_lengths()).collect();

    let figures = [
        ("AxisLength_Major.png", swarm_plot(&names, &majors, "Major axis (um)")?),
        ("AxisLength_Minor.png", swarm_plot(&names, &minors, "Minor axis (um)")?),
        ("AxisLength_MinorvsMajor.png", scatter_plot(&names, &majors, &minors)?),
    ];

    let mut written = Vec::new();
    for (name, img) in figures {
        let path = output_dir.join(name);
        save_rgb(&path, &img)?;
        written.push(path);
    }
    Ok(written)
}
