//! Application errors.

use inkbake_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Invalid script: {0}")]
    Script(String),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("Session ended without an outcome")]
    NoOutcome,
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
