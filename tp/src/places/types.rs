//! Place types shared by the resolver and the places providers

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A normalized destination ready for itinerary generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Short place name ("Paris")
    pub name: String,

    /// Name shown to the user and embedded in prompts ("Paris, France")
    pub display_name: String,

    /// External place identifier, when the place came from autocomplete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,

    /// Coordinates, when the place was resolved by the external capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
}

impl PlaceCandidate {
    /// A bare destination name with no identifier and no coordinates
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(%name, "PlaceCandidate::named: called");
        Self {
            display_name: name.clone(),
            name,
            place_id: None,
            location: None,
        }
    }

    /// Whether this candidate carries coordinates
    pub fn is_geolocated(&self) -> bool {
        self.location.is_some()
    }
}

/// An autocomplete prediction from the external capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceSuggestion {
    pub description: String,
    pub place_id: String,
}

impl From<PlaceSuggestion> for PlaceCandidate {
    fn from(suggestion: PlaceSuggestion) -> Self {
        Self {
            name: suggestion.description.clone(),
            display_name: suggestion.description,
            place_id: Some(suggestion.place_id),
            location: None,
        }
    }
}

/// A place committed through the external autocomplete widget
///
/// Mirrors what the capability hands back on selection; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalSelection {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    pub location: Option<LatLng>,
}

impl ExternalSelection {
    /// Normalize into a candidate; selections without coordinates or any name yield `None`
    pub fn into_candidate(self) -> Option<PlaceCandidate> {
        debug!(place_id = ?self.place_id, has_location = self.location.is_some(), "into_candidate: called");
        let location = self.location?;
        let display_name = self.formatted_address.clone().or_else(|| self.name.clone())?;
        let name = self.name.unwrap_or_else(|| display_name.clone());
        Some(PlaceCandidate {
            name,
            display_name,
            place_id: self.place_id,
            location: Some(location),
        })
    }
}
