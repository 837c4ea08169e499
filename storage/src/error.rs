//! Storage error types.
//!
//! Used by repository implementations, PhotoStorage and callers of storage APIs.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    /// A story record with this id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// An uploaded file had zero bytes; carries the declared filename.
    #[error("Uploaded file '{0}' was empty")]
    EmptyUpload(String),
    /// The resolved file of a stored photo is missing.
    #[error("Photo file not found: {0}")]
    PhotoNotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}
