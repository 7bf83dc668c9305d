//! Error types for the precomputation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for refract-sh operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Source mesh is malformed (bad face, bad corner, bad index buffer)
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Index refers past the end of the table it indexes
    #[error("Index {index} out of range (count: {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Mesh key already consumed by the assembler
    #[error("Mesh already consumed: {0}")]
    DuplicateMesh(String),

    /// SH cache text does not match the expected layout
    #[error("Malformed SH cache at line {line}: {reason}")]
    CacheFormat { line: usize, reason: String },

    /// The upload collaborator rejected the combined geometry
    #[error("Upload failed: {0}")]
    Upload(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization error
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid mesh error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }
}

/// Result type alias for refract-sh operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::IndexOutOfRange { index: 7, count: 3 };
        assert!(e.to_string().contains("7"));
        assert!(e.to_string().contains("3"));

        let e = Error::CacheFormat { line: 12, reason: "expected 100 values, got 99".into() };
        assert!(e.to_string().contains("line 12"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
