//! Error types for the roi-eval library.

use thiserror::Error;

/// Result type for roi-eval operations.
pub type Result<T> = std::result::Result<T, RoiEvalError>;

/// Error types that can occur while scoring detections.
#[derive(Error, Debug)]
pub enum RoiEvalError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Ground truth and computed records are not aligned image-for-image.
    #[error("Image mismatch: {0}")]
    ImageMismatch(String),

    /// Malformed line in a region-list file.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Invalid score or overlap threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Cost matrix is ragged or holds negative costs.
    #[error("Invalid cost matrix: {0}")]
    InvalidCostMatrix(String),

    /// The assignment solver produced an infeasible result.
    #[error("Assignment infeasible: {0}")]
    AssignmentInfeasible(String),

    /// Inconsistent run configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
