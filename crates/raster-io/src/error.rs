//! Error types for raster I/O.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading, resampling or writing rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The input file does not exist or cannot be opened.
    #[error("cannot open raster {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not map to a known raster format.
    #[error("unsupported raster format: {0}")]
    UnsupportedFormat(String),

    /// The file exists but its contents could not be decoded.
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Band count or dimensions are not usable for the requested operation.
    #[error("unsupported raster shape: {0}")]
    UnsupportedShape(String),

    /// The affine transform cannot be used for the requested operation.
    #[error("invalid georeferencing: {0}")]
    InvalidTransform(String),

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding an output buffer failed.
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl RasterError {
    /// Create a NotFound error.
    pub fn not_found(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::NotFound {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a Decode error.
    pub fn decode(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an UnsupportedShape error.
    pub fn unsupported_shape(msg: impl Into<String>) -> Self {
        Self::UnsupportedShape(msg.into())
    }

    /// Create a WriteFailed error.
    pub fn write_failed(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
