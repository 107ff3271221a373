use crate::analysis::{analyze_image, ImageAnalysis, Measurement};
use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::image_io::GrayImage;
use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Receives every successfully analysed image, e.g. to write QA figures.
///
/// Called from worker threads, so implementations must be `Sync`.
pub trait AnalysisSink: Sync {
    fn image_analyzed(
        &self,
        dataset: &str,
        image: &GrayImage,
        analysis: &ImageAnalysis,
    ) -> anyhow::Result<()>;
}

/// Sink that discards everything.
impl AnalysisSink for () {
    fn image_analyzed(&self, _: &str, _: &GrayImage, _: &ImageAnalysis) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetResult {
    pub name: String,
    pub directory: PathBuf,
    /// File order, then label order within a file.
    pub measurements: Vec<Measurement>,
    pub images_processed: usize,
    pub failures: Vec<ImageFailure>,
}

impl DatasetResult {
    pub fn major_lengths(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.major_axis_length).collect()
    }

    pub fn minor_lengths(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.minor_axis_length).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of a full run, datasets in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub datasets: Vec<DatasetResult>,
    pub failed_datasets: Vec<DatasetFailure>,
}

/// Regular, non-hidden files in `dir`, sorted by name.
///
/// Sub-directories (e.g. earlier `thresholded/` output) are skipped.
pub fn list_image_files(dir: &Path, pattern: Option<&Regex>) -> PipelineResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingInput(dir.to_path_buf()));
    }
    let entries = std::fs::read_dir(dir).map_err(|_| PipelineError::MissingInput(dir.to_path_buf()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = file_name(path);
            !name.starts_with('.') && pattern.is_none_or(|re| re.is_match(&name))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn process_file(
    dataset: &str,
    path: &Path,
    config: &AnalysisConfig,
    sink: &dyn AnalysisSink,
) -> Result<Vec<Measurement>, ImageFailure> {
    let name = file_name(path);
    let failure = |e: PipelineError| ImageFailure {
        file: name.clone(),
        error: e.to_string(),
    };

    let image = GrayImage::from_file(path).map_err(failure)?;
    let analysis = analyze_image(&image, &name, config).map_err(failure)?;
    tracing::debug!(
        dataset,
        file = %name,
        regions = analysis.regions_found,
        kept = analysis.kept.len(),
        "image analysed"
    );

    if let Err(e) = sink.image_analyzed(dataset, &image, &analysis) {
        tracing::warn!(dataset, file = %name, "failed to write figures: {:#}", e);
    }
    Ok(analysis.measurements)
}

/// Measure every image of one dataset directory.
///
/// A missing directory fails the dataset; unreadable or unthresholdable images
/// are recorded in `failures` and contribute no measurements.
pub fn aggregate_dataset(
    name: &str,
    dir: &Path,
    config: &AnalysisConfig,
    sink: &dyn AnalysisSink,
) -> PipelineResult<DatasetResult> {
    let pattern = config.file_regex()?;
    let files = list_image_files(dir, pattern.as_ref())?;
    tracing::info!(dataset = name, dir = %dir.display(), files = files.len(), "processing dataset");

    let outcomes: Vec<Result<Vec<Measurement>, ImageFailure>> = files
        .par_iter()
        .map(|path| process_file(name, path, config, sink))
        .collect();

    let mut result = DatasetResult {
        name: name.to_string(),
        directory: dir.to_path_buf(),
        measurements: Vec::new(),
        images_processed: 0,
        failures: Vec::new(),
    };
    for outcome in outcomes {
        match outcome {
            Ok(measurements) => {
                result.images_processed += 1;
                result.measurements.extend(measurements);
            }
            Err(failure) => {
                tracing::warn!(dataset = name, file = %failure.file, "skipping image: {}", failure.error);
                result.failures.push(failure);
            }
        }
    }

    tracing::info!(
        dataset = name,
        images = result.images_processed,
        failed = result.failures.len(),
        spindles = result.measurements.len(),
        "dataset done"
    );
    Ok(result)
}

/// Run every configured dataset in declaration order.
pub fn aggregate_all(config: &AnalysisConfig, sink: &dyn AnalysisSink) -> PipelineResult<RunReport> {
    config.validate()?;

    let run = || {
        let mut report = RunReport {
            datasets: Vec::new(),
            failed_datasets: Vec::new(),
        };
        for name in &config.datasets {
            let dir = config.dataset_dir(name);
            match aggregate_dataset(name, &dir, config, sink) {
                Ok(result) => report.datasets.push(result),
                Err(e) => {
                    tracing::warn!(dataset = %name, "dataset skipped: {}", e);
                    report.failed_datasets.push(DatasetFailure {
                        name: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    };

    match config.workers {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| PipelineError::Config(format!("cannot start worker pool: {}", e)))?;
            Ok(pool.install(run))
        }
        None => Ok(run()),
    }
}
