use std::path::PathBuf;

/// Errors raised by the segmentation and aggregation pipeline.
///
/// Per-image errors (`InvalidImage`, `ImageLoad`) are recorded and skipped by the
/// aggregator; `MissingInput` aborts only the dataset it belongs to.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("missing input: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to load image {}: {message}", .path.display())]
    ImageLoad { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
