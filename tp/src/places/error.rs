//! Places error types

use thiserror::Error;

/// Errors from the external places capability
///
/// A committed selection without coordinates is not an error: the resolver simply
/// ignores it.
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Places API status {status}: {message}")]
    Status { status: String, message: String },

    #[error("Places API responded {0}")]
    Http(u16),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Places capability unavailable: {0}")]
    Unavailable(String),
}
