//! Error types for pathline parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a pathline file.
#[derive(Error, Debug)]
pub enum ModpathError {
    /// The file does not exist or cannot be read.
    #[error("cannot read pathline file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line is not a recognised pathline file signature.
    #[error("not a MODPATH pathline file: {0}")]
    UnknownFormat(String),

    /// The file declares a MODPATH version this reader does not handle.
    #[error("unsupported MODPATH version {0}")]
    UnsupportedVersion(u32),

    /// A record could not be parsed.
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

impl ModpathError {
    /// Create a Malformed error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// Result type for pathline parsing.
pub type Result<T> = std::result::Result<T, ModpathError>;
