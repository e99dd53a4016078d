//! PlacesProvider trait definition

use async_trait::async_trait;

use super::{ExternalSelection, PlaceSuggestion, PlacesError};

/// External rich-autocomplete and place-details capability
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Whether the capability is loaded and usable right now
    fn is_available(&self) -> bool;

    /// Autocomplete predictions for free-text input
    async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, PlacesError>;

    /// Resolve a prediction into a committed selection
    async fn details(&self, place_id: &str) -> Result<ExternalSelection, PlacesError>;

    /// Up to `max` photo URLs for a place
    async fn photo_urls(&self, place_id: &str, max: usize) -> Result<Vec<String>, PlacesError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Mock places capability with a togglable availability flag
    #[derive(Default)]
    pub struct MockPlacesProvider {
        available: AtomicBool,
        pub suggestions: Vec<PlaceSuggestion>,
        pub fail_autocomplete: bool,
        pub details: HashMap<String, ExternalSelection>,
        pub photos: HashMap<String, Vec<String>>,
        autocomplete_calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    impl MockPlacesProvider {
        pub fn new(available: bool) -> Self {
            Self {
                available: AtomicBool::new(available),
                ..Default::default()
            }
        }

        pub fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        pub fn autocomplete_calls(&self) -> usize {
            self.autocomplete_calls.load(Ordering::SeqCst)
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlacesProvider for MockPlacesProvider {
        fn is_available(&self) -> bool {
            self.available.load(Ordering::SeqCst)
        }

        async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, PlacesError> {
            self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(input.to_string());
            if self.fail_autocomplete {
                return Err(PlacesError::Http(503));
            }
            Ok(self.suggestions.clone())
        }

        async fn details(&self, place_id: &str) -> Result<ExternalSelection, PlacesError> {
            self.details
                .get(place_id)
                .cloned()
                .ok_or_else(|| PlacesError::Status {
                    status: "NOT_FOUND".to_string(),
                    message: place_id.to_string(),
                })
        }

        async fn photo_urls(&self, place_id: &str, max: usize) -> Result<Vec<String>, PlacesError> {
            let mut photos = self.photos.get(place_id).cloned().unwrap_or_default();
            photos.truncate(max);
            Ok(photos)
        }
    }
}
