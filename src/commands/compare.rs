use crate::export::{read_dataset_csv, RunSummary};
use anyhow::Result;
use std::path::Path;

fn dataset_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    stem.strip_prefix("SpindleAxesLengths_")
        .map(str::to_string)
        .unwrap_or(stem)
}

/// Recompute the summary statistics from two previously exported CSVs.
pub fn compare_csvs(csv_a: &Path, csv_b: &Path) -> Result<RunSummary> {
    let (major_a, minor_a) = read_dataset_csv(csv_a)?;
    let (major_b, minor_b) = read_dataset_csv(csv_b)?;

    let summary = RunSummary::from_groups(
        vec![dataset_name(csv_a), dataset_name(csv_b)],
        &[major_a, major_b],
        &[minor_a, minor_b],
    );
    print!("{}", summary.to_text());
    Ok(summary)
}
