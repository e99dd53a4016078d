//! Itinerary generation
//!
//! Builds a prompt from a destination and trip parameters, runs one logical generation
//! through the retry policy and cleans up whatever markup the model produced anyway.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::{debug, info};

mod prompt;
mod sanitize;

pub use prompt::build_prompt;
pub use sanitize::{MARKUP_CHARS, sanitize};

use crate::llm::{GenerationClient, GenerationError, GenerationRequest};
use crate::places::PlaceCandidate;
use crate::retry::RetryPolicy;

/// Value used for style and companions when the user gave none
pub const ANY: &str = "any";

/// Default trip length in days
pub const DEFAULT_DAYS: u32 = 3;

/// User-chosen trip parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripParameters {
    pub days: NonZeroU32,
    pub style: String,
    pub companions: String,
}

impl TripParameters {
    /// Blank style or companions normalize to "any"
    pub fn new(days: NonZeroU32, style: &str, companions: &str) -> Self {
        Self {
            days,
            style: normalize(style),
            companions: normalize(companions),
        }
    }
}

impl Default for TripParameters {
    fn default() -> Self {
        Self {
            days: NonZeroU32::new(DEFAULT_DAYS).unwrap_or(NonZeroU32::MIN),
            style: ANY.to_string(),
            companions: ANY.to_string(),
        }
    }
}

fn normalize(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() { ANY.to_string() } else { value.to_string() }
}

/// Sanitized itinerary text tied to the destination and parameters it was generated for
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryResult {
    place: PlaceCandidate,
    params: TripParameters,
    text: String,
}

impl ItineraryResult {
    pub fn place(&self) -> &PlaceCandidate {
        &self.place
    }

    pub fn params(&self) -> &TripParameters {
        &self.params
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for ItineraryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Requests itineraries from a generation client
pub struct ItineraryRequester {
    client: Arc<dyn GenerationClient>,
    retry: RetryPolicy,
}

impl ItineraryRequester {
    pub fn new(client: Arc<dyn GenerationClient>, retry: RetryPolicy) -> Self {
        debug!(max_attempts = retry.max_attempts(), "ItineraryRequester::new: called");
        Self { client, retry }
    }

    /// Generate an itinerary for `place`
    ///
    /// Upstream and network failures are retried per the policy. A payload without
    /// text, or with only whitespace, is `EmptyResponse` and is not retried.
    pub async fn generate(
        &self,
        place: &PlaceCandidate,
        params: &TripParameters,
    ) -> Result<ItineraryResult, GenerationError> {
        debug!(destination = %place.display_name, days = params.days.get(), "generate: called");
        let prompt = build_prompt(place, params);

        let response = self
            .retry
            .execute_when(
                || self.client.generate(GenerationRequest::new(prompt.clone())),
                GenerationError::is_transient,
            )
            .await?;

        let raw = response
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;
        let text = sanitize(&raw);
        info!(destination = %place.display_name, chars = text.len(), "generate: itinerary ready");

        Ok(ItineraryResult {
            place: place.clone(),
            params: params.clone(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationResponse;
    use crate::llm::client::mock::MockGenerationClient;
    use std::time::Duration;

    fn days(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn requester(mock: &Arc<MockGenerationClient>) -> ItineraryRequester {
        ItineraryRequester::new(mock.clone(), RetryPolicy::new(3, Duration::from_millis(800)))
    }

    #[test]
    fn test_parameters_normalize_blank() {
        let params = TripParameters::new(days(2), "  ", "");
        assert_eq!(params.style, "any");
        assert_eq!(params.companions, "any");

        let params = TripParameters::new(days(2), " relaxed ", "family");
        assert_eq!(params.style, "relaxed");
        assert_eq!(params.companions, "family");
    }

    #[test]
    fn test_parameters_default() {
        let params = TripParameters::default();
        assert_eq!(params.days.get(), 3);
        assert_eq!(params.style, "any");
        assert_eq!(params.companions, "any");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_retries_transient_failure() {
        let mock = Arc::new(MockGenerationClient::new(vec![
            Err(GenerationError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Ok(GenerationResponse::text("**Day 1**\n- Visit Shibuya")),
        ]));
        let place = PlaceCandidate::named("Tokyo, Japan");
        let params = TripParameters::new(days(5), "adventure", "solo");

        let result = requester(&mock).generate(&place, &params).await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(result.text(), "Day 1\nVisit Shibuya");
        assert_eq!(result.place(), &place);
        assert_eq!(result.params(), &params);

        let prompt = &mock.prompts()[0];
        assert!(prompt.contains("Tokyo, Japan"));
        assert!(prompt.contains("5-day"));
        assert!(prompt.contains("adventure"));
        assert!(prompt.contains("solo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_gives_up_after_budget() {
        let mock = Arc::new(MockGenerationClient::new(
            (0..3)
                .map(|i| {
                    Err(GenerationError::Api {
                        status: 500 + i,
                        message: "down".to_string(),
                    })
                })
                .collect(),
        ));
        let place = PlaceCandidate::named("Paris, France");

        let err = requester(&mock)
            .generate(&place, &TripParameters::default())
            .await
            .unwrap_err();

        assert_eq!(mock.call_count(), 3);
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_empty_payload_not_retried() {
        let mock = Arc::new(MockGenerationClient::new(vec![
            Ok(GenerationResponse::empty()),
            Ok(GenerationResponse::text("unused")),
        ]));

        let err = requester(&mock)
            .generate(&PlaceCandidate::named("Rome, Italy"), &TripParameters::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::EmptyResponse));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_config_error_not_retried() {
        let mock = Arc::new(MockGenerationClient::new(vec![Err(GenerationError::Config(
            "model not set".to_string(),
        ))]));

        let err = requester(&mock)
            .generate(&PlaceCandidate::named("Rome, Italy"), &TripParameters::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Config(_)));
        assert_eq!(mock.call_count(), 1);
    }
}
