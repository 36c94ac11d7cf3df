use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the fruit classification application.
///
/// Each variant captures context specific to its error domain (filesystem,
/// input image, frozen artifacts, model inference), so callers can
/// distinguish "no fruit in this image" from "the deployment is broken"
/// without parsing error strings. The thiserror crate generates Display
/// implementations from the format strings.
#[derive(Error, Debug)]
pub enum FruitClassError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// The input cannot be used at all: undecodable bytes or a zero-area image.
    #[error("Invalid image ({path}): {reason}")]
    InvalidImage { path: String, reason: String },

    /// The saturation threshold matched no pixels, so the foreground means
    /// are undefined. Surfaced to the user as "no fruit detected".
    #[error("no fruit detected: segmentation produced no foreground pixels")]
    EmptySegmentation,

    /// A loaded artifact disagrees with the shape the pipeline was trained
    /// for. Fatal at startup, never retried per request.
    #[error("Artifact shape mismatch in {artifact}: expected {expected}, got {actual}")]
    ArtifactShape {
        artifact: String,
        expected: String,
        actual: String,
    },

    /// The frozen scaler/label bundle or the model file cannot be read.
    #[error("Artifact load failure: {operation} failed for {path:?}")]
    ArtifactLoad {
        path: PathBuf,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, FruitClassError>;

/// Convert anyhow errors to configuration errors at the binary boundary.
impl From<anyhow::Error> for FruitClassError {
    fn from(err: anyhow::Error) -> Self {
        FruitClassError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Convert I/O errors without call-site context to filesystem errors.
/// Code that has context should construct FruitClassError::FileSystem
/// directly with the specific path and operation.
impl From<std::io::Error> for FruitClassError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to invalid-image errors.
impl From<image::ImageError> for FruitClassError {
    fn from(err: image::ImageError) -> Self {
        Self::InvalidImage {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Convert ONNX Runtime errors to model errors.
impl From<ort::Error> for FruitClassError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to model errors. Shape errors only occur
/// during tensor handling around inference, so they live in the model
/// category rather than a separate tensor error type.
impl From<ndarray::ShapeError> for FruitClassError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert serde_json errors to artifact load failures. JSON only appears
/// in the artifact bundle and the result printing, and printing a derived
/// Serialize never fails in practice.
impl From<serde_json::Error> for FruitClassError {
    fn from(err: serde_json::Error) -> Self {
        Self::ArtifactLoad {
            path: PathBuf::from("unknown"),
            operation: "JSON deserialization".to_string(),
            source: Box::new(err),
        }
    }
}
