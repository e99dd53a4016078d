//! DestinationResolver - free text to place candidates
//!
//! Prefers the external autocomplete capability. Availability is checked once at
//! construction and once more after a fixed delay, so a capability that finishes loading
//! late still takes over. If neither check succeeds the resolver stays on the curated
//! list for its whole lifetime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::catalog::filter_destinations;
use super::{ExternalSelection, PlaceCandidate, PlacesError, PlacesProvider};

/// Default delay before re-checking capability availability
pub const DEFAULT_REDETECT_DELAY: Duration = Duration::from_millis(1000);

/// How the resolver is currently producing suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverMode {
    /// Delegating to the external autocomplete capability
    Rich,
    /// Filtering the curated destination list
    Fallback,
}

/// Resolves user input into a selected [`PlaceCandidate`]
pub struct DestinationResolver {
    provider: Option<Arc<dyn PlacesProvider>>,
    rich: Arc<AtomicBool>,
    redetect: Option<JoinHandle<()>>,
    selection: Option<PlaceCandidate>,
}

impl DestinationResolver {
    /// A resolver with no external capability at all
    pub fn fallback_only() -> Self {
        debug!("DestinationResolver::fallback_only: called");
        Self {
            provider: None,
            rich: Arc::new(AtomicBool::new(false)),
            redetect: None,
            selection: None,
        }
    }

    /// Detect the capability now and, if absent, once more after `redetect_delay`
    ///
    /// Must be called from within a tokio runtime when the first check fails.
    pub fn new(provider: Arc<dyn PlacesProvider>, redetect_delay: Duration) -> Self {
        debug!(?redetect_delay, "DestinationResolver::new: called");
        let rich = Arc::new(AtomicBool::new(provider.is_available()));

        let redetect = if rich.load(Ordering::SeqCst) {
            info!("Places capability available, using rich autocomplete");
            None
        } else {
            debug!("DestinationResolver::new: capability not ready, scheduling re-check");
            let provider = Arc::clone(&provider);
            let rich = Arc::clone(&rich);
            Some(tokio::spawn(async move {
                tokio::time::sleep(redetect_delay).await;
                if provider.is_available() {
                    info!("Places capability became available late, switching to rich autocomplete");
                    rich.store(true, Ordering::SeqCst);
                } else {
                    info!("Places capability unavailable, using curated destinations");
                }
            }))
        };

        Self {
            provider: Some(provider),
            rich,
            redetect,
            selection: None,
        }
    }

    /// Current suggestion mode
    pub fn mode(&self) -> ResolverMode {
        if self.rich.load(Ordering::SeqCst) {
            ResolverMode::Rich
        } else {
            ResolverMode::Fallback
        }
    }

    /// The most recently committed destination
    pub fn selection(&self) -> Option<&PlaceCandidate> {
        self.selection.as_ref()
    }

    /// Suggestions for raw input
    ///
    /// In rich mode a failing capability degrades to the curated list for this call.
    pub async fn suggest(&self, input: &str) -> Vec<PlaceCandidate> {
        debug!(%input, mode = ?self.mode(), "suggest: called");
        if let (ResolverMode::Rich, Some(provider)) = (self.mode(), &self.provider) {
            if input.trim().is_empty() {
                return Vec::new();
            }
            match provider.autocomplete(input).await {
                Ok(suggestions) => {
                    debug!(count = suggestions.len(), "suggest: rich suggestions");
                    return suggestions.into_iter().map(PlaceCandidate::from).collect();
                }
                Err(e) => {
                    warn!(error = %e, "suggest: autocomplete failed, using curated destinations");
                }
            }
        }

        filter_destinations(input)
            .into_iter()
            .map(PlaceCandidate::named)
            .collect()
    }

    /// Commit an explicit pick from the suggestion list
    ///
    /// The resulting candidate has no place id and no coordinates.
    pub fn pick_suggestion(&mut self, destination: &str) -> &PlaceCandidate {
        debug!(%destination, "pick_suggestion: called");
        self.selection.insert(PlaceCandidate::named(destination.trim()))
    }

    /// Commit a selection event from the external widget
    ///
    /// Selections without coordinates are ignored and the previous selection is kept.
    pub fn commit_selection(&mut self, selection: ExternalSelection) -> Option<&PlaceCandidate> {
        debug!(place_id = ?selection.place_id, "commit_selection: called");
        match selection.into_candidate() {
            Some(candidate) => {
                debug!(display_name = %candidate.display_name, "commit_selection: accepted");
                Some(self.selection.insert(candidate))
            }
            None => {
                debug!("commit_selection: no geometry, ignoring");
                None
            }
        }
    }

    /// Resolve an autocomplete prediction through the capability and commit it
    pub async fn commit_place(&mut self, place_id: &str) -> Result<Option<&PlaceCandidate>, PlacesError> {
        debug!(%place_id, "commit_place: called");
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| PlacesError::Unavailable("no places capability configured".to_string()))?;
        let selection = provider.details(place_id).await?;
        Ok(self.commit_selection(selection))
    }

    /// Photo URLs for a place, empty when the capability is missing or fails
    pub async fn photo_urls(&self, place: &PlaceCandidate, max: usize) -> Vec<String> {
        debug!(place_id = ?place.place_id, max, "photo_urls: called");
        let (Some(provider), Some(place_id)) = (&self.provider, &place.place_id) else {
            return Vec::new();
        };
        if self.mode() != ResolverMode::Rich {
            return Vec::new();
        }
        match provider.photo_urls(place_id, max).await {
            Ok(mut urls) => {
                urls.truncate(max);
                urls
            }
            Err(e) => {
                warn!(error = %e, %place_id, "photo_urls: photo lookup failed");
                Vec::new()
            }
        }
    }
}

impl Drop for DestinationResolver {
    fn drop(&mut self) {
        if let Some(handle) = self.redetect.take() {
            handle.abort();
        }
    }
}
