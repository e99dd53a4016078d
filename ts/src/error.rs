//! Store error types

use thiserror::Error;

/// Errors that can occur while reading or writing trip records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Trip not found: {0}")]
    NotFound(String),

    #[error("Corrupt trip record: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check if this error means the record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
