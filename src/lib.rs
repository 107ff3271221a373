pub mod aggregate;
pub mod analysis;
pub mod axes;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod image_io;
pub mod labeling;
pub mod logging;
pub mod morphology;
pub mod region;
pub mod render;
pub mod statistics;
pub mod threshold;
pub mod utils;

#[cfg(test)]
mod test_segmentation;

// Re-export commonly used items
pub use aggregate::{aggregate_all, aggregate_dataset, AnalysisSink, DatasetResult, RunReport};
pub use analysis::{analyze_image, ImageAnalysis, Measurement};
pub use axes::{derive_axes, to_physical_lengths, AxisSegment, Point};
pub use config::AnalysisConfig;
pub use error::{PipelineError, PipelineResult};
pub use image_io::GrayImage;
pub use region::Region;
