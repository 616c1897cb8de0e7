//! Error types shared across the cancellation analysis crates.
//!
//! Only conditions that stop a dataset from being analysed are errors.
//! An empty click log, an undefined metric and parallel path segments are
//! ordinary outcomes and are modelled in the data types instead.

use std::path::PathBuf;

/// Top-level error type for cancellation analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum CancellationError {
    #[error("Parse error in {path} (line {line}): {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Missing column '{column}' in header of {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Result type alias using CancellationError.
pub type CancellationResult<T> = Result<T, CancellationError>;

impl CancellationError {
    pub fn parse(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }

    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this failure means the machine itself is in trouble, in which
    /// case a batch run stops instead of moving on to the next dataset.
    pub fn is_resource_exhaustion(&self) -> bool {
        let io = match self {
            Self::Io(e) => e,
            Self::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(e) => e,
                _ => return false,
            },
            _ => return false,
        };
        matches!(
            io.kind(),
            std::io::ErrorKind::OutOfMemory | std::io::ErrorKind::StorageFull
        )
    }
}
