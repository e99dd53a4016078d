//! Generation error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while requesting generated text
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation API responded {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Response contained no generated text")]
    EmptyResponse,

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerationError {
    /// Check if this error is a transient upstream failure worth retrying
    ///
    /// Any non-success status and any transport failure counts; malformed or empty
    /// payloads and configuration problems do not.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Api { .. } => true,
            GenerationError::Network(_) => true,
            GenerationError::Timeout(_) => true,
            GenerationError::EmptyResponse => false,
            GenerationError::Json(_) => false,
            GenerationError::Config(_) => false,
        }
    }

    /// Get the upstream HTTP status, if the failure carried one
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::Api { status, .. } => Some(*status),
            GenerationError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
