use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spindle-axes")]
#[command(about = "Measure major and minor axes of segmented spindles", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Measure every dataset and write CSVs, statistics and figures
    Measure {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding one sub-directory per dataset
        #[arg(long)]
        data_root: Option<PathBuf>,

        /// Where results are written
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Dataset name (repeatable, replaces the configured list)
        #[arg(short, long = "dataset")]
        datasets: Vec<String>,

        /// Minimum region area in pixels
        #[arg(long)]
        min_area: Option<usize>,

        /// Micrometres per pixel
        #[arg(long)]
        pixel_to_micron: Option<f64>,

        /// Skip mask, axes and summary figures
        #[arg(long)]
        no_figures: bool,
    },

    /// Measure a single image and print the qualifying regions
    AnalyzeImage {
        /// Image file (TIFF, PNG, ...)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Minimum region area in pixels
        #[arg(long)]
        min_area: Option<usize>,

        /// Side of the square closing element
        #[arg(long)]
        closing_size: Option<usize>,

        /// Micrometres per pixel
        #[arg(long)]
        pixel_to_micron: Option<f64>,

        /// Write the axes overlay to this PNG
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Compare two exported dataset CSVs (means, std, Welch's t-test)
    Compare {
        /// First dataset CSV
        csv_a: PathBuf,

        /// Second dataset CSV
        csv_b: PathBuf,
    },

    /// Print the default configuration as JSON
    DefaultConfig,
}
