//! Region properties from second-order image moments.
//!
//! Moments are accumulated as exact integer sums so the central moments, and
//! the circular tie-break that depends on them, do not pick up rounding noise.

use crate::labeling::LabelGrid;
use nalgebra::Matrix2;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Inclusive pixel bounds of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub label: u32,
    pub area: usize,
    /// Mean column.
    pub x0: f64,
    /// Mean row.
    pub y0: f64,
    /// Angle between the row axis and the major axis, in (-pi/2, pi/2].
    pub orientation: f64,
    pub major_axis_length: f64,
    pub minor_axis_length: f64,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy)]
struct MomentAccumulator {
    n: u64,
    sum_r: u64,
    sum_c: u64,
    sum_rr: u64,
    sum_cc: u64,
    sum_rc: u64,
    bbox: BoundingBox,
}

impl MomentAccumulator {
    fn new(row: usize, col: usize) -> Self {
        Self {
            n: 0,
            sum_r: 0,
            sum_c: 0,
            sum_rr: 0,
            sum_cc: 0,
            sum_rc: 0,
            bbox: BoundingBox {
                min_row: row,
                min_col: col,
                max_row: row,
                max_col: col,
            },
        }
    }

    fn add(&mut self, row: usize, col: usize) {
        let (r, c) = (row as u64, col as u64);
        self.n += 1;
        self.sum_r += r;
        self.sum_c += c;
        self.sum_rr += r * r;
        self.sum_cc += c * c;
        self.sum_rc += r * c;
        self.bbox.min_row = self.bbox.min_row.min(row);
        self.bbox.min_col = self.bbox.min_col.min(col);
        self.bbox.max_row = self.bbox.max_row.max(row);
        self.bbox.max_col = self.bbox.max_col.max(col);
    }

    fn into_region(self, label: u32) -> Region {
        let n = self.n as i128;
        let (sr, sc) = (self.sum_r as i128, self.sum_c as i128);

        // n^2 times the normalized central moments.
        let num_rr = n * self.sum_rr as i128 - sr * sr;
        let num_cc = n * self.sum_cc as i128 - sc * sc;
        let num_rc = n * self.sum_rc as i128 - sr * sc;

        let n2 = (n * n) as f64;
        let mu_rr = num_rr as f64 / n2;
        let mu_cc = num_cc as f64 / n2;
        let mu_rc = num_rc as f64 / n2;

        let (major_axis_length, minor_axis_length) = axis_lengths(mu_rr, mu_cc, mu_rc);

        Region {
            label,
            area: self.n as usize,
            x0: self.sum_c as f64 / self.n as f64,
            y0: self.sum_r as f64 / self.n as f64,
            orientation: orientation(num_rr, num_cc, num_rc),
            major_axis_length,
            minor_axis_length,
            bbox: self.bbox,
        }
    }
}

/// `4 * sqrt(lambda)` for the two eigenvalues of the covariance matrix, largest first.
fn axis_lengths(mu_rr: f64, mu_cc: f64, mu_rc: f64) -> (f64, f64) {
    let covariance = Matrix2::new(mu_rr, mu_rc, mu_rc, mu_cc);
    let eigenvalues = covariance.symmetric_eigenvalues();
    let (a, b) = (eigenvalues[0].max(0.0), eigenvalues[1].max(0.0));
    let (l1, l2) = if a >= b { (a, b) } else { (b, a) };
    (4.0 * l1.sqrt(), 4.0 * l2.sqrt())
}

/// Orientation from the (scaled) central moments.
///
/// When the two variances tie the angle is pi/4 if `mu_rc < 0` and -pi/4
/// otherwise.
fn orientation(num_rr: i128, num_cc: i128, num_rc: i128) -> f64 {
    if num_rr == num_cc {
        return if num_rc < 0 { FRAC_PI_4 } else { -FRAC_PI_4 };
    }
    let theta = 0.5 * (2.0 * num_rc as f64).atan2((num_rr - num_cc) as f64);
    if theta <= -FRAC_PI_2 {
        theta + PI
    } else {
        theta
    }
}

/// Measure every labeled region, ordered by label.
pub fn measure(grid: &LabelGrid) -> Vec<Region> {
    let mut accumulators: Vec<Option<MomentAccumulator>> = vec![None; grid.num_labels as usize];

    for row in 0..grid.height {
        for col in 0..grid.width {
            let label = grid.get(row, col);
            if label == 0 {
                continue;
            }
            accumulators[label as usize - 1]
                .get_or_insert_with(|| MomentAccumulator::new(row, col))
                .add(row, col);
        }
    }

    accumulators
        .into_iter()
        .enumerate()
        .filter_map(|(i, acc)| acc.map(|acc| acc.into_region(i as u32 + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::label;
    use crate::morphology::Mask;

    fn measure_mask(mask: &Mask) -> Vec<Region> {
        measure(&label(mask))
    }

    #[test]
    fn test_single_pixel_region() {
        let mut mask = Mask::new(3, 3);
        mask.set(1, 2, true);
        let regions = measure_mask(&mask);
        assert_eq!(regions.len(), 1);
        let r = &regions[0];
        assert_eq!(r.area, 1);
        assert_eq!((r.x0, r.y0), (2.0, 1.0));
        assert_eq!(r.major_axis_length, 0.0);
        assert_eq!(r.minor_axis_length, 0.0);
    }

    #[test]
    fn test_horizontal_line() {
        // 1 x 10 run of pixels along a row: variance along columns only.
        let mask = Mask::from_fn(12, 3, |r, c| r == 1 && (1..=10).contains(&c));
        let r = &measure_mask(&mask)[0];
        assert_eq!(r.area, 10);
        assert!((r.x0 - 5.5).abs() < 1e-12);
        // var = (10^2 - 1) / 12
        let expected = 4.0 * (99.0f64 / 12.0).sqrt();
        assert!((r.major_axis_length - expected).abs() < 1e-9);
        assert!(r.minor_axis_length.abs() < 1e-6);
        assert!((r.orientation - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(
            r.bbox,
            BoundingBox {
                min_row: 1,
                min_col: 1,
                max_row: 1,
                max_col: 10
            }
        );
        assert_eq!(r.bbox.width(), 10);
        assert_eq!(r.bbox.height(), 1);
    }

    #[test]
    fn test_vertical_line_has_zero_orientation() {
        let mask = Mask::from_fn(3, 12, |r, c| c == 1 && (1..=10).contains(&r));
        let r = &measure_mask(&mask)[0];
        assert!(r.orientation.abs() < 1e-12);
    }

    #[test]
    fn test_diagonal_line_tie_break() {
        // Equal variances along both axes; the sign of mu_rc picks the angle.
        let mask = Mask::from_fn(8, 8, |r, c| r == c);
        let r = &measure_mask(&mask)[0];
        assert_eq!(r.orientation, -FRAC_PI_4);
        assert!(r.minor_axis_length.abs() < 1e-6);

        let anti = Mask::from_fn(8, 8, |r, c| r + c == 7);
        let r = &measure_mask(&anti)[0];
        assert_eq!(r.orientation, FRAC_PI_4);
    }

    #[test]
    fn test_tie_break_follows_covariance_sign() {
        assert_eq!(orientation(10, 10, 3), -FRAC_PI_4);
        assert_eq!(orientation(10, 10, -3), FRAC_PI_4);
        assert_eq!(orientation(10, 10, 0), -FRAC_PI_4);
    }

    #[test]
    fn test_square_hits_tie_break() {
        let mask = Mask::from_fn(6, 6, |r, c| (1..5).contains(&r) && (1..5).contains(&c));
        let r = &measure_mask(&mask)[0];
        assert_eq!(r.orientation, -FRAC_PI_4);
        assert!((r.major_axis_length - r.minor_axis_length).abs() < 1e-12);
    }

    #[test]
    fn test_regions_ordered_by_label() {
        let mask = Mask::from_fn(10, 10, |r, c| (r < 2 && c < 2) || (r > 6 && c > 6));
        let regions = measure_mask(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].label, 1);
        assert_eq!(regions[1].label, 2);
        assert_eq!(regions[0].area, 4);
        assert_eq!(regions[1].area, 9);
    }
}
