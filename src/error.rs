//! Error types for loading and rendering the comet scene

use thiserror::Error;

/// Result type for visualization operations
pub type VisResult<T> = Result<T, VisError>;

/// Errors that can occur while loading data or configuration
#[derive(Error, Debug)]
pub enum VisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
