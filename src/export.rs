use crate::aggregate::{DatasetResult, RunReport};
use crate::config::AnalysisConfig;
use crate::statistics::AxisSummary;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "major_axis_length, minor_axis_length";
pub const SUMMARY_FILE: &str = "Stats-AxisLength.txt";
pub const JSON_FILE: &str = "measurements.json";

/// Cross-dataset statistics for both axes.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub datasets: Vec<String>,
    pub major: AxisSummary,
    pub minor: AxisSummary,
}

impl RunSummary {
    pub fn from_results(results: &[DatasetResult]) -> Self {
        let majors: Vec<Vec<f64>> = results.iter().map(|r| r.major_lengths()).collect();
        let minors: Vec<Vec<f64>> = results.iter().map(|r| r.minor_lengths()).collect();
        Self::from_groups(results.iter().map(|r| r.name.clone()).collect(), &majors, &minors)
    }

    pub fn from_groups(datasets: Vec<String>, majors: &[Vec<f64>], minors: &[Vec<f64>]) -> Self {
        Self {
            datasets,
            major: AxisSummary::from_groups(majors),
            minor: AxisSummary::from_groups(minors),
        }
    }

    /// Plain-text report: names, counts, per-axis means/stds and Welch p-values.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "datasets = {:?}", self.datasets);
        let _ = writeln!(out, "n_spindles = {:?}", self.major.counts);

        for (title, key, axis) in [
            ("Major Axis", "p_major", &self.major),
            ("Minor Axis", "p_minor", &self.minor),
        ] {
            let _ = writeln!(out, "\n{}", title);
            let _ = writeln!(out, "means = {}", format_list(&axis.means));
            let _ = writeln!(out, "std = {}", format_list(&axis.std_devs));
            if let Some(welch) = &axis.welch {
                let _ = writeln!(out, "{} = {:?}", key, welch.p_value);
            }
        }
        out
    }
}

fn format_list(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
    format!("[{}]", items.join(", "))
}

pub fn csv_path(output_dir: &Path, dataset: &str) -> PathBuf {
    output_dir.join(format!("SpindleAxesLengths_{}.csv", dataset))
}

pub fn write_dataset_csv(path: &Path, result: &DatasetResult) -> Result<()> {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for m in &result.measurements {
        let _ = writeln!(out, "{:?}, {:?}", m.major_axis_length, m.minor_axis_length);
    }
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read `(major, minor)` columns back from a dataset CSV.
///
/// Header and `#` comment lines are skipped.
pub fn read_dataset_csv(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut majors = Vec::new();
    let mut minors = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("major_axis_length") {
            continue;
        }
        let mut fields = line.split(',').map(str::trim);
        let (Some(major), Some(minor)) = (fields.next(), fields.next()) else {
            anyhow::bail!("{}:{}: expected two columns", path.display(), line_no + 1);
        };
        majors.push(
            major
                .parse::<f64>()
                .with_context(|| format!("{}:{}: bad major value", path.display(), line_no + 1))?,
        );
        minors.push(
            minor
                .parse::<f64>()
                .with_context(|| format!("{}:{}: bad minor value", path.display(), line_no + 1))?,
        );
    }
    Ok((majors, minors))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    config: &'a AnalysisConfig,
    summary: &'a RunSummary,
    report: &'a RunReport,
}

/// Write CSVs, the text summary and the JSON dump; returns the summary.
pub fn write_run_outputs(config: &AnalysisConfig, report: &RunReport) -> Result<RunSummary> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;

    for result in &report.datasets {
        write_dataset_csv(&csv_path(&config.output_dir, &result.name), result)?;
    }

    let summary = RunSummary::from_results(&report.datasets);
    if summary.datasets.len() != 2 {
        tracing::warn!(
            datasets = summary.datasets.len(),
            "significance test needs exactly two datasets, p-values omitted"
        );
    }
    let summary_path = config.output_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, summary.to_text())
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    let json = JsonReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        config,
        summary: &summary,
        report,
    };
    let json_path = config.output_dir.join(JSON_FILE);
    fs::write(&json_path, serde_json::to_string_pretty(&json)?)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Measurement;
    use crate::axes::{AxisSegment, Point};

    fn dataset(name: &str, majors: &[f64], minors: &[f64]) -> DatasetResult {
        let origin = Point { x: 0.0, y: 0.0 };
        DatasetResult {
            name: name.to_string(),
            directory: PathBuf::from(name),
            measurements: majors
                .iter()
                .zip(minors)
                .enumerate()
                .map(|(i, (&major, &minor))| Measurement {
                    file: format!("cell{}.tif", i),
                    label: 1,
                    area: 9000,
                    major_axis_length: major,
                    minor_axis_length: minor,
                    axes: AxisSegment {
                        centroid: origin,
                        major_end: origin,
                        minor_end: origin,
                    },
                })
                .collect(),
            images_processed: majors.len(),
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_summary_reports_means_and_significance() {
        let results = [
            dataset("ctrl", &[20.0, 22.0, 21.0], &[10.0, 11.0, 12.0]),
            dataset("p50", &[30.0, 31.0, 29.0], &[10.5, 11.5, 11.0]),
        ];
        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.major.means, vec![21.0, 30.0]);
        assert!(summary.major.welch.unwrap().p_value < 0.05);

        let text = summary.to_text();
        assert!(text.contains("datasets = [\"ctrl\", \"p50\"]"));
        assert!(text.contains("n_spindles = [3, 3]"));
        assert!(text.contains("means = [21.0, 30.0]"));
        assert!(text.contains("p_major = "));
        assert!(text.contains("p_minor = "));
    }

    #[test]
    fn test_summary_without_pair_omits_p_values() {
        let summary = RunSummary::from_results(&[dataset("only", &[20.0, 21.0], &[9.0, 9.5])]);
        let text = summary.to_text();
        assert!(text.contains("means = [20.5]"));
        assert!(!text.contains("p_major"));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let result = dataset("ctrl", &[20.125, 22.5], &[10.0, 11.75]);
        let path = csv_path(dir.path(), "ctrl");
        write_dataset_csv(&path, &result).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        assert!(text.contains("20.125, 10.0"));

        let (majors, minors) = read_dataset_csv(&path).unwrap();
        assert_eq!(majors, vec![20.125, 22.5]);
        assert_eq!(minors, vec![10.0, 11.75]);
    }

    #[test]
    fn test_read_csv_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "# major_axis_length, minor_axis_length\n1.0, abc\n").unwrap();
        assert!(read_dataset_csv(&path).is_err());
    }

    #[test]
    fn test_write_run_outputs_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            output_dir: dir.path().join("out"),
            datasets: vec!["ctrl".to_string(), "p50".to_string()],
            ..Default::default()
        };
        let report = RunReport {
            datasets: vec![
                dataset("ctrl", &[20.0, 22.0, 21.0], &[10.0, 11.0, 12.0]),
                dataset("p50", &[30.0, 31.0, 29.0], &[10.5, 11.5, 11.0]),
            ],
            failed_datasets: Vec::new(),
        };
        write_run_outputs(&config, &report).unwrap();

        assert!(csv_path(&config.output_dir, "ctrl").exists());
        assert!(csv_path(&config.output_dir, "p50").exists());
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.output_dir.join(JSON_FILE)).unwrap())
                .unwrap();
        assert_eq!(json["report"]["datasets"][1]["name"], "p50");
        assert_eq!(json["summary"]["major"]["means"][0], 21.0);
    }
}
