//! Trip record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image URLs shown alongside a saved trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripImages {
    /// Hero image for the destination
    pub main: String,

    /// Secondary "travel" image
    pub travel: String,
}

/// A trip as submitted for saving; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub destination: String,
    pub itinerary: String,
    pub images: TripImages,
}

impl NewTrip {
    pub fn new(destination: impl Into<String>, itinerary: impl Into<String>, images: TripImages) -> Self {
        Self {
            destination: destination.into(),
            itinerary: itinerary.into(),
            images,
        }
    }
}

/// A saved trip belonging to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: String,
    pub destination: String,
    pub itinerary: String,
    pub images: TripImages,

    /// Free-form notes added after saving
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation time, assigned by the store
    pub timestamp: DateTime<Utc>,
}

impl TripRecord {
    /// Case-insensitive destination search, as used by the trip list filter
    pub fn matches(&self, query: &str) -> bool {
        self.destination.to_lowercase().contains(&query.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(destination: &str) -> TripRecord {
        TripRecord {
            id: "t1".to_string(),
            destination: destination.to_string(),
            itinerary: "Day 1".to_string(),
            images: TripImages::default(),
            notes: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let trip = record("Kyoto, Japan");
        assert!(trip.matches("kyoto"));
        assert!(trip.matches("JAPAN"));
        assert!(trip.matches(""));
        assert!(!trip.matches("tokyo"));
    }
}
