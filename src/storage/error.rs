//! Error types for storage backends.

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {path}")]
    NotFound { path: String },

    /// Path escapes the store root or is otherwise unusable.
    #[error("invalid object path: {path}")]
    InvalidPath { path: String },

    #[error("invalid range {start}-{end} for '{path}' with size {size}")]
    InvalidRange {
        path: String,
        start: u64,
        end: u64,
        size: u64,
    },

    #[error("storage {operation} failed for '{path}': {message}")]
    Unavailable {
        operation: &'static str,
        path: String,
        message: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn unavailable(
        operation: &'static str,
        path: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        StoreError::Unavailable {
            operation,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        StoreError::NotFound { path: path.into() }
    }

    /// Maps `ErrorKind::NotFound` onto [`StoreError::NotFound`].
    pub fn from_io(path: &str, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::not_found(path)
        } else {
            StoreError::Io(e)
        }
    }
}
