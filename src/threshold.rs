use crate::error::{PipelineError, PipelineResult};
use crate::image_io::GrayImage;
use crate::morphology::{Mask, SquareElement};

/// Otsu's global threshold over the integer intensity histogram.
///
/// Candidates run over every intensity in `[min, max)`; class 0 holds values `<= t`.
/// Returns the first `t` maximizing `w0 * w1 * (mu0 - mu1)^2`.
pub fn otsu_threshold(image: &GrayImage) -> PipelineResult<u16> {
    if image.is_empty() {
        return Err(PipelineError::InvalidImage(
            "cannot threshold an empty image".to_string(),
        ));
    }

    let min = image.data.iter().copied().min().unwrap_or(0);
    let max = image.data.iter().copied().max().unwrap_or(0);
    if min == max {
        return Err(PipelineError::InvalidImage(format!(
            "image is constant-valued ({}), threshold is undefined",
            min
        )));
    }

    let bins = (max - min) as usize + 1;
    let mut histogram = vec![0u64; bins];
    for &v in &image.data {
        histogram[(v - min) as usize] += 1;
    }

    let total = image.data.len() as f64;
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();

    let mut weight_b = 0.0;
    let mut sum_b = 0.0;
    let mut best_variance = -1.0;
    let mut best = 0usize;

    for (i, &count) in histogram.iter().enumerate().take(bins - 1) {
        weight_b += count as f64;
        sum_b += i as f64 * count as f64;
        if weight_b == 0.0 {
            continue;
        }
        let weight_f = total - weight_b;
        if weight_f == 0.0 {
            break;
        }

        let mean_b = sum_b / weight_b;
        let mean_f = (sum_total - sum_b) / weight_f;
        let w0 = weight_b / total;
        let w1 = weight_f / total;
        let variance = w0 * w1 * (mean_b - mean_f).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best = i;
        }
    }

    Ok(min + best as u16)
}

/// Pixels strictly above `t`.
pub fn binarize(image: &GrayImage, t: u16) -> Mask {
    Mask {
        width: image.width,
        height: image.height,
        data: image.data.iter().map(|&v| v > t).collect(),
    }
}

/// Otsu threshold followed by a square closing of side `closing_size`.
pub fn threshold(image: &GrayImage, closing_size: usize) -> PipelineResult<Mask> {
    let t = otsu_threshold(image)?;
    let raw = binarize(image, t);
    tracing::debug!(
        threshold = t,
        foreground = raw.count_foreground(),
        "otsu threshold applied"
    );
    Ok(SquareElement::new(closing_size).close(&raw))
}
