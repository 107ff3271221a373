use crate::analysis::{analyze_image, Measurement};
use crate::cli::OutputFormat;
use crate::config::AnalysisConfig;
use crate::image_io::GrayImage;
use crate::render::axes_overlay;
use crate::utils::truncate_string;
use anyhow::{Context, Result};
use std::path::Path;

pub fn analyze_single_image(
    file: &Path,
    format: OutputFormat,
    config: &AnalysisConfig,
    overlay: Option<&Path>,
) -> Result<Vec<Measurement>> {
    let image = GrayImage::from_file(file)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let analysis = analyze_image(&image, &name, config)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;
    tracing::info!(
        file = %name,
        regions = analysis.regions_found,
        kept = analysis.kept.len(),
        "image analysed"
    );

    if let Some(path) = overlay {
        let img = axes_overlay(&image, &analysis);
        img.save(path)
            .with_context(|| format!("Failed to save overlay to {}", path.display()))?;
        println!("Overlay saved to {}", path.display());
    }

    match format {
        OutputFormat::Json => output_json(&analysis.measurements)?,
        OutputFormat::Csv => output_csv(&analysis.measurements),
        OutputFormat::Table => output_table(&analysis.measurements),
    }
    Ok(analysis.measurements)
}

fn output_table(measurements: &[Measurement]) {
    println!(
        "{:<30} {:>6} {:>8} {:>12} {:>12} {:>18}",
        "File", "Label", "Area", "Major (um)", "Minor (um)", "Centroid (x, y)"
    );
    println!("{:-<91}", "");
    for m in measurements {
        println!(
            "{:<30} {:>6} {:>8} {:>12.3} {:>12.3} {:>18}",
            truncate_string(&m.file, 30),
            m.label,
            m.area,
            m.major_axis_length,
            m.minor_axis_length,
            format!("({:.1}, {:.1})", m.axes.centroid.x, m.axes.centroid.y)
        );
    }
    println!("\nTotal: {} spindles", measurements.len());
}

fn output_json(measurements: &[Measurement]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(measurements)?);
    Ok(())
}

fn output_csv(measurements: &[Measurement]) {
    println!("file,label,area,major_axis_length,minor_axis_length,centroid_x,centroid_y");
    for m in measurements {
        println!(
            "{},{},{},{},{},{},{}",
            m.file,
            m.label,
            m.area,
            m.major_axis_length,
            m.minor_axis_length,
            m.axes.centroid.x,
            m.axes.centroid.y
        );
    }
}
