use crate::region::Region;
use serde::{Deserialize, Serialize};

/// Default pixel-to-micrometre ratio of the reference microscope.
pub const DEFAULT_PIXEL_TO_MICRON: f64 = 0.105;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Centroid plus one endpoint on each half-axis, in image coordinates
/// (x = column, y = row growing downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSegment {
    pub centroid: Point,
    pub major_end: Point,
    pub minor_end: Point,
}

pub fn derive_axes(region: &Region) -> AxisSegment {
    let (x0, y0) = (region.x0, region.y0);
    let (sin, cos) = region.orientation.sin_cos();

    let x2 = x0 - sin * 0.5 * region.major_axis_length;
    let y2 = y0 - cos * 0.5 * region.major_axis_length;
    let x1 = x0 + cos * 0.5 * region.minor_axis_length;
    let y1 = y0 - sin * 0.5 * region.minor_axis_length;

    AxisSegment {
        centroid: Point { x: x0, y: y0 },
        major_end: Point { x: x2, y: y2 },
        minor_end: Point { x: x1, y: y1 },
    }
}

/// `(major, minor)` lengths in micrometres.
pub fn to_physical_lengths(region: &Region, pixel_to_micron: f64) -> (f64, f64) {
    (
        to_micron(region.major_axis_length, pixel_to_micron),
        to_micron(region.minor_axis_length, pixel_to_micron),
    )
}

#[inline]
pub fn to_micron(pixels: f64, pixel_to_micron: f64) -> f64 {
    pixels * pixel_to_micron
}

#[inline]
pub fn to_pixel_length(micron: f64, pixel_to_micron: f64) -> f64 {
    micron / pixel_to_micron
}
