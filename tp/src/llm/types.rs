//! Generation request/response types
//!
//! Provider-agnostic: one prompt in, at most one block of text out.

use tracing::debug;

/// A single-shot prompt completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Full prompt text
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        debug!("GenerationRequest::new: called");
        Self { prompt: prompt.into() }
    }
}

/// The provider's answer to a [`GenerationRequest`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Generated text; `None` when the payload lacked the text field
    pub text: Option<String>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}
