use crate::axes::{derive_axes, to_physical_lengths, AxisSegment};
use crate::config::AnalysisConfig;
use crate::error::PipelineResult;
use crate::image_io::GrayImage;
use crate::labeling::{label, LabelGrid};
use crate::morphology::Mask;
use crate::region::{measure, Region};
use crate::threshold::threshold;
use serde::{Deserialize, Serialize};

/// Axis lengths of one qualifying region, in micrometres, with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub file: String,
    pub label: u32,
    pub area: usize,
    pub major_axis_length: f64,
    pub minor_axis_length: f64,
    pub axes: AxisSegment,
}

/// Everything computed for a single image.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub file: String,
    pub mask: Mask,
    pub labels: LabelGrid,
    /// Regions that cleared the area filter, ordered by label.
    pub kept: Vec<Region>,
    /// One entry per kept region, same order.
    pub measurements: Vec<Measurement>,
    pub regions_found: usize,
}

/// Threshold, label, measure and filter one image.
pub fn analyze_image(
    image: &GrayImage,
    file: &str,
    config: &AnalysisConfig,
) -> PipelineResult<ImageAnalysis> {
    let mask = threshold(image, config.morphological_closing_size)?;
    let labels = label(&mask);
    let regions = measure(&labels);
    let regions_found = regions.len();

    let kept: Vec<Region> = regions
        .into_iter()
        .filter(|r| r.area >= config.min_region_area)
        .collect();

    let measurements = kept
        .iter()
        .map(|region| {
            let (major, minor) = to_physical_lengths(region, config.pixel_to_micron);
            tracing::debug!(
                file,
                label = region.label,
                area = region.area,
                major_px = region.major_axis_length,
                minor_px = region.minor_axis_length,
                orientation = region.orientation,
                "region kept"
            );
            Measurement {
                file: file.to_string(),
                label: region.label,
                area: region.area,
                major_axis_length: major,
                minor_axis_length: minor,
                axes: derive_axes(region),
            }
        })
        .collect();

    Ok(ImageAnalysis {
        file: file.to_string(),
        mask,
        labels,
        kept,
        measurements,
        regions_found,
    })
}
