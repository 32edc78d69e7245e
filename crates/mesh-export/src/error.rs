//! Error types for mesh conversion.

use std::fmt;
use std::path::{Path, PathBuf};

use modpath_parser::ModpathError;
use raster_io::RasterError;
use thiserror::Error;

/// Step of a conversion at which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadElevation,
    ReadImage,
    BuildMesh,
    Texture,
    Encode,
    ReadPathlines,
    WriteOutputs,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadElevation => "reading elevation raster",
            Self::ReadImage => "reading image raster",
            Self::BuildMesh => "building mesh",
            Self::Texture => "texture mapping",
            Self::Encode => "encoding outputs",
            Self::ReadPathlines => "reading pathlines",
            Self::WriteOutputs => "writing outputs",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while converting rasters or pathlines to meshes.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// An input file is missing or unreadable.
    #[error("{stage}: input {} not found or unreadable: {source}", path.display())]
    InputNotFound {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Band count, dimensions or georeferencing cannot be used.
    #[error("{stage}: unsupported raster shape in {}: {message}", path.display())]
    UnsupportedRasterShape {
        stage: Stage,
        path: PathBuf,
        message: String,
    },

    /// An output file could not be written.
    #[error("{stage}: cannot write {}: {source}", path.display())]
    OutputWriteFailed {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mesh vertices project outside the image and the policy rejects that.
    #[error("{count} mesh vertices fall outside the extent of texture {}", path.display())]
    TextureOutOfExtent { path: PathBuf, count: usize },

    /// An input raster exists but could not be decoded.
    #[error("{stage}: {}: {source}", path.display())]
    Raster {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    /// A pathline file exists but could not be parsed.
    #[error("{stage}: {}: {source}", path.display())]
    Pathlines {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: ModpathError,
    },

    /// Serializing a VTK dataset failed.
    #[error("{stage}: VTK serialization failed: {message}")]
    Vtk { stage: Stage, message: String },

    /// Options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl ConvertError {
    /// Attach stage and path to a raster error, keeping the error class.
    pub fn from_raster(stage: Stage, path: impl AsRef<Path>, err: RasterError) -> Self {
        let path = path.as_ref().to_path_buf();
        match err {
            RasterError::NotFound { path, source } => Self::InputNotFound { stage, path, source },
            RasterError::UnsupportedShape(message) | RasterError::InvalidTransform(message) => {
                Self::UnsupportedRasterShape { stage, path, message }
            }
            RasterError::WriteFailed { path, source } => Self::OutputWriteFailed { stage, path, source },
            source => Self::Raster { stage, path, source },
        }
    }

    /// Attach a path to a pathline parse error.
    pub fn from_modpath(path: impl AsRef<Path>, err: ModpathError) -> Self {
        match err {
            ModpathError::Io { path, source } => Self::InputNotFound {
                stage: Stage::ReadPathlines,
                path,
                source,
            },
            source => Self::Pathlines {
                stage: Stage::ReadPathlines,
                path: path.as_ref().to_path_buf(),
                source,
            },
        }
    }

    /// Create a Vtk error.
    pub fn vtk(stage: Stage, message: impl Into<String>) -> Self {
        Self::Vtk {
            stage,
            message: message.into(),
        }
    }

    /// The stage that failed, when known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::InputNotFound { stage, .. }
            | Self::UnsupportedRasterShape { stage, .. }
            | Self::OutputWriteFailed { stage, .. }
            | Self::Raster { stage, .. }
            | Self::Pathlines { stage, .. }
            | Self::Vtk { stage, .. } => Some(*stage),
            Self::TextureOutOfExtent { .. } => Some(Stage::Texture),
            Self::InvalidOptions(_) => None,
        }
    }
}

/// Result type for mesh conversion.
pub type Result<T> = std::result::Result<T, ConvertError>;
