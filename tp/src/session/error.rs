//! Authentication error types

use thiserror::Error;

/// Errors from the identity provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Sign-in unavailable: {0}")]
    Unavailable(String),

    #[error("Identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Session revoked: {0}")]
    Revoked(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credential cache error: {0}")]
    Io(#[from] std::io::Error),
}
