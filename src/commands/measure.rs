use crate::aggregate::{aggregate_all, AnalysisSink};
use crate::config::AnalysisConfig;
use crate::export::{write_run_outputs, RunSummary};
use crate::render::{write_summary_plots, FigureWriter};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Command-line values that replace configured ones when present.
#[derive(Debug, Default)]
pub struct MeasureOverrides {
    pub data_root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub datasets: Vec<String>,
    pub min_area: Option<usize>,
    pub pixel_to_micron: Option<f64>,
    pub no_figures: bool,
}

pub fn build_config(config_path: Option<&Path>, overrides: MeasureOverrides) -> Result<AnalysisConfig> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(root) = overrides.data_root {
        config.data_root = root;
    }
    if let Some(dir) = overrides.output_dir {
        config.output_dir = dir;
    }
    if !overrides.datasets.is_empty() {
        config.datasets = overrides.datasets;
    }
    if let Some(area) = overrides.min_area {
        config.min_region_area = area;
    }
    if let Some(factor) = overrides.pixel_to_micron {
        config.pixel_to_micron = factor;
    }
    if overrides.no_figures {
        config.save_figures = false;
    }
    Ok(config)
}

pub fn run_measure(config: &AnalysisConfig) -> Result<RunSummary> {
    config.validate().context("Invalid configuration")?;

    let figures = FigureWriter::new(&config.output_dir);
    let sink: &dyn AnalysisSink = if config.save_figures { &figures } else { &() };

    let report = aggregate_all(config, sink)?;
    if report.datasets.is_empty() {
        anyhow::bail!("No dataset could be processed ({} failed)", report.failed_datasets.len());
    }

    let summary = write_run_outputs(config, &report)?;
    if config.save_figures {
        write_summary_plots(&config.output_dir, &report.datasets)?;
    }

    for (name, count) in summary.datasets.iter().zip(&summary.major.counts) {
        tracing::info!(dataset = %name, spindles = count, "measured");
    }
    tracing::info!(output = %config.output_dir.display(), "results written");

    print!("{}", summary.to_text());
    Ok(summary)
}
