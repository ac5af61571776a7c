//! Error types for the body measurement library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Result document could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input image does not exist
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// Input image exists but could not be decoded
    #[error("Cannot read image: {}", .0.display())]
    ImageDecode(PathBuf),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model input configuration error
    #[error("Model input error: {0}")]
    ModelInputError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Model data shape or format error
    #[error("Model data format error: {0}")]
    ModelDataFormatError(String),

    /// Model asset could not be fetched
    #[error("Failed to download pose model: {0}")]
    ModelDownload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Coarse classification used to pick the process outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad user input: missing or unreadable image, unparseable argument
    Input,
    /// Anything else: model load, download, internal faults
    Unexpected,
}

impl Error {
    /// Classify this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ImageNotFound(_) | Self::ImageDecode(_) | Self::InvalidInput(_) => ErrorCategory::Input,
            _ => ErrorCategory::Unexpected,
        }
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
