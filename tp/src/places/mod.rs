//! Destination lookup
//!
//! Turns free-text input into a [`PlaceCandidate`], preferring an external autocomplete
//! capability and falling back to a curated list of popular destinations.

mod catalog;
mod error;
mod google;
mod images;
pub mod provider;
mod resolver;
mod types;

pub use catalog::{POPULAR_DESTINATIONS, filter_destinations};
pub use error::PlacesError;
pub use google::GooglePlacesClient;
pub use images::{keyword_image_url, select_images};
pub use provider::PlacesProvider;
pub use resolver::{DEFAULT_REDETECT_DELAY, DestinationResolver, ResolverMode};
pub use types::{ExternalSelection, LatLng, PlaceCandidate, PlaceSuggestion};
