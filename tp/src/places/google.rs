//! Google Places web service client
//!
//! Implements PlacesProvider on top of the autocomplete, details and photo endpoints.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{ExternalSelection, LatLng, PlaceSuggestion, PlacesError, PlacesProvider};
use crate::config::PlacesConfig;

/// Google Places API client
pub struct GooglePlacesClient {
    api_key: String,
    base_url: String,
    photo_max_width: u32,
    http: Client,
}

impl GooglePlacesClient {
    /// Create a new client from configuration
    ///
    /// Fails with `Unavailable` when the API key is not set, which callers treat as
    /// "run in fallback mode".
    pub fn from_config(config: &PlacesConfig) -> Result<Self, PlacesError> {
        debug!(base_url = %config.base_url, "from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PlacesError::Unavailable(format!("{} is not set", config.api_key_env)))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            photo_max_width: config.photo_max_width,
            http,
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut all = params.to_vec();
        all.push(("key", self.api_key.as_str()));
        Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), &all)
            .map_err(|e| PlacesError::Unavailable(format!("invalid places URL: {}", e)))
    }

    /// Photo media URL for a photo reference
    fn photo_url(&self, photo_reference: &str) -> Result<String, PlacesError> {
        let width = self.photo_max_width.to_string();
        Ok(self
            .url("photo", &[("maxwidth", width.as_str()), ("photo_reference", photo_reference)])?
            .to_string())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PlacesError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "get_json: HTTP error");
            return Err(PlacesError::Http(status.as_u16()));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Map the service-level status field to an error when it is not a success
fn check_status(status: &str, message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(PlacesError::Status {
            status: other.to_string(),
            message: message.unwrap_or_default(),
        }),
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, PlacesError> {
        debug!(%input, "autocomplete: called");
        let url = self.url("autocomplete/json", &[("input", input), ("types", "(cities)")])?;
        let body: AutocompleteResponse = self.get_json(url).await?;
        check_status(&body.status, body.error_message)?;

        Ok(body
            .predictions
            .into_iter()
            .map(|p| PlaceSuggestion {
                description: p.description,
                place_id: p.place_id,
            })
            .collect())
    }

    async fn details(&self, place_id: &str) -> Result<ExternalSelection, PlacesError> {
        debug!(%place_id, "details: called");
        let url = self.url(
            "details/json",
            &[
                ("place_id", place_id),
                ("fields", "formatted_address,geometry,name,place_id"),
            ],
        )?;
        let body: DetailsResponse = self.get_json(url).await?;
        check_status(&body.status, body.error_message)?;

        let result = body.result.unwrap_or_default();
        Ok(ExternalSelection {
            name: result.name,
            formatted_address: result.formatted_address,
            place_id: result.place_id.or_else(|| Some(place_id.to_string())),
            location: result.geometry.map(|g| LatLng {
                lat: g.location.lat,
                lng: g.location.lng,
            }),
        })
    }

    async fn photo_urls(&self, place_id: &str, max: usize) -> Result<Vec<String>, PlacesError> {
        debug!(%place_id, max, "photo_urls: called");
        let url = self.url("details/json", &[("place_id", place_id), ("fields", "photos")])?;
        let body: DetailsResponse = self.get_json(url).await?;
        check_status(&body.status, body.error_message)?;

        body.result
            .unwrap_or_default()
            .photos
            .into_iter()
            .take(max)
            .map(|p| self.photo_url(&p.photo_reference))
            .collect()
    }
}

// Places API response types

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    description: String,
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    error_message: Option<String>,
    result: Option<DetailsResult>,
}

#[derive(Debug, Default, Deserialize)]
struct DetailsResult {
    name: Option<String>,
    formatted_address: Option<String>,
    place_id: Option<String>,
    geometry: Option<Geometry>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}
