use crate::axes::DEFAULT_PIXEL_TO_MICRON;
use crate::error::{PipelineError, PipelineResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_REGION_AREA: usize = 8000;
pub const DEFAULT_CLOSING_SIZE: usize = 3;

/// Configuration for a batch measurement run.
///
/// Every field has a default so a config file only needs the keys it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Micrometres per pixel
    pub pixel_to_micron: f64,
    /// Regions smaller than this (pixels) are ignored
    pub min_region_area: usize,
    /// Side of the square closing element
    pub morphological_closing_size: usize,
    /// Dataset names, in the order they are reported and plotted
    pub datasets: Vec<String>,
    /// Directory holding one sub-directory per dataset
    pub data_root: PathBuf,
    /// Optional path below each dataset directory where the images live
    pub image_subdir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Regex a file name must match to be processed
    pub file_pattern: Option<String>,
    /// Write per-image mask/axes figures and the summary plots
    pub save_figures: bool,
    /// Worker threads for per-image processing (None = all cores)
    pub workers: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pixel_to_micron: DEFAULT_PIXEL_TO_MICRON,
            min_region_area: DEFAULT_MIN_REGION_AREA,
            morphological_closing_size: DEFAULT_CLOSING_SIZE,
            datasets: Vec::new(),
            data_root: PathBuf::from("."),
            image_subdir: None,
            output_dir: PathBuf::from("output"),
            file_pattern: None,
            save_figures: true,
            workers: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !(self.pixel_to_micron.is_finite() && self.pixel_to_micron > 0.0) {
            return Err(PipelineError::Config(format!(
                "pixel_to_micron must be positive, got {}",
                self.pixel_to_micron
            )));
        }
        if self.datasets.is_empty() {
            return Err(PipelineError::Config(
                "at least one dataset must be configured".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(PipelineError::Config(
                "workers must be at least 1".to_string(),
            ));
        }
        self.file_regex()?;
        Ok(())
    }

    pub fn file_regex(&self) -> PipelineResult<Option<Regex>> {
        self.file_pattern
            .as_deref()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| PipelineError::Config(format!("invalid file_pattern: {}", e)))
            })
            .transpose()
    }

    /// Directory holding the images of `dataset`.
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        let base = self.data_root.join(dataset);
        match &self.image_subdir {
            Some(sub) => base.join(sub),
            None => base,
        }
    }
}
