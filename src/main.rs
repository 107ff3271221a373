use anyhow::Result;
use clap::Parser;
use spindle_axes::cli::{Cli, Commands};
use spindle_axes::commands::{
    analyze_single_image, build_config, compare_csvs, print_default_config, run_measure,
    MeasureOverrides,
};
use spindle_axes::config::AnalysisConfig;
use spindle_axes::logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Measure {
            config,
            data_root,
            output_dir,
            datasets,
            min_area,
            pixel_to_micron,
            no_figures,
        } => {
            let config = build_config(
                config.as_deref(),
                MeasureOverrides {
                    data_root,
                    output_dir,
                    datasets,
                    min_area,
                    pixel_to_micron,
                    no_figures,
                },
            )?;
            run_measure(&config)?;
        }
        Commands::AnalyzeImage {
            file,
            format,
            min_area,
            closing_size,
            pixel_to_micron,
            overlay,
        } => {
            let defaults = AnalysisConfig::default();
            let config = AnalysisConfig {
                min_region_area: min_area.unwrap_or(defaults.min_region_area),
                morphological_closing_size: closing_size
                    .unwrap_or(defaults.morphological_closing_size),
                pixel_to_micron: pixel_to_micron.unwrap_or(defaults.pixel_to_micron),
                ..defaults
            };
            if config.pixel_to_micron <= 0.0 {
                anyhow::bail!("--pixel-to-micron must be positive");
            }
            analyze_single_image(&file, format, &config, overlay.as_deref())?;
        }
        Commands::Compare { csv_a, csv_b } => {
            compare_csvs(&csv_a, &csv_b)?;
        }
        Commands::DefaultConfig => {
            print_default_config()?;
        }
    }

    Ok(())
}
