//! GenerationClient trait definition

use async_trait::async_trait;

use super::{GenerationError, GenerationRequest, GenerationResponse};

/// Stateless text generation client - each call is an independent prompt completion
///
/// Implementations make exactly one upstream request per call. Retrying is the
/// caller's business (see [`crate::retry::RetryPolicy`]).
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send a single prompt and wait for the full completion
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, GenerationError>;
}
