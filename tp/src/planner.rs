//! TripPlanner - wires session, destination lookup, generation and saved trips together

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};
use tripstore::{NewTrip, TripImages, TripRecord};

use crate::itinerary::{ItineraryRequester, ItineraryResult, TripParameters};
use crate::llm::GenerationError;
use crate::places::{DestinationResolver, PlaceCandidate, ResolverMode, select_images};
use crate::session::{Identity, SessionReconciler};
use crate::trips::{PersistenceError, TripManager};

/// Default number of place photos used for trip images
pub const DEFAULT_MAX_PHOTOS: usize = 2;

/// Errors surfaced to the user by planner operations
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Log in to save trips")]
    NotSignedIn,

    #[error("Enter a destination")]
    EmptyDestination,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A generated itinerary with the images chosen for it
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub itinerary: ItineraryResult,
    pub images: TripImages,
}

impl TripPlan {
    pub fn destination(&self) -> &str {
        &self.itinerary.place().display_name
    }

    pub fn to_new_trip(&self) -> NewTrip {
        NewTrip::new(self.destination(), self.itinerary.text(), self.images.clone())
    }
}

/// Facade over the planner's components
pub struct TripPlanner {
    session: SessionReconciler,
    resolver: DestinationResolver,
    requester: ItineraryRequester,
    trips: TripManager,
    max_photos: usize,
}

impl TripPlanner {
    pub fn new(
        session: SessionReconciler,
        resolver: DestinationResolver,
        requester: ItineraryRequester,
        trips: TripManager,
    ) -> Self {
        debug!("TripPlanner::new: called");
        Self {
            session,
            resolver,
            requester,
            trips,
            max_photos: DEFAULT_MAX_PHOTOS,
        }
    }

    pub fn with_max_photos(mut self, max_photos: usize) -> Self {
        self.max_photos = max_photos;
        self
    }

    pub fn session(&self) -> &SessionReconciler {
        &self.session
    }

    pub fn resolver(&self) -> &DestinationResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut DestinationResolver {
        &mut self.resolver
    }

    /// Suggestions for free-text input
    pub async fn suggest(&self, input: &str) -> Vec<PlaceCandidate> {
        self.resolver.suggest(input).await
    }

    /// Turn free text into a committed destination
    ///
    /// In rich mode the top autocomplete prediction is resolved through the
    /// capability. Anything that does not yield a geolocated place falls back to
    /// taking the text as typed.
    pub async fn resolve_destination(&mut self, input: &str) -> Result<PlaceCandidate, PlanError> {
        debug!(%input, "resolve_destination: called");
        let input = input.trim();
        if input.is_empty() {
            return Err(PlanError::EmptyDestination);
        }

        if self.resolver.mode() == ResolverMode::Rich {
            let top = self
                .resolver
                .suggest(input)
                .await
                .into_iter()
                .find_map(|c| c.place_id);
            if let Some(place_id) = top {
                match self.resolver.commit_place(&place_id).await {
                    Ok(Some(candidate)) => return Ok(candidate.clone()),
                    Ok(None) => debug!(%place_id, "resolve_destination: prediction had no geometry"),
                    Err(e) => warn!(error = %e, %place_id, "resolve_destination: place details failed"),
                }
            }
        }

        Ok(self.resolver.pick_suggestion(input).clone())
    }

    /// Generate an itinerary and pick images for `place`
    pub async fn plan(&self, place: &PlaceCandidate, params: &TripParameters) -> Result<TripPlan, PlanError> {
        debug!(destination = %place.display_name, "plan: called");
        let itinerary = self.requester.generate(place, params).await?;
        let photos = self.resolver.photo_urls(place, self.max_photos).await;
        let images = select_images(&place.display_name, &photos, Utc::now().timestamp_millis());
        info!(destination = %place.display_name, photo_count = photos.len(), "Trip planned");
        Ok(TripPlan { itinerary, images })
    }

    fn require_identity(&self) -> Result<Identity, PlanError> {
        self.session.current_identity().ok_or(PlanError::NotSignedIn)
    }

    /// Save a plan for the signed-in user
    pub async fn save(&self, plan: &TripPlan) -> Result<TripRecord, PlanError> {
        debug!(destination = %plan.destination(), "save: called");
        let identity = self.require_identity()?;
        let record = self.trips.create(&identity.uid, plan.to_new_trip()).await?;
        info!(id = %record.id, uid = %identity.uid, "Trip saved");
        Ok(record)
    }

    pub fn trips(&self) -> &TripManager {
        &self.trips
    }

    /// Stop background tasks
    pub async fn shutdown(&self) {
        debug!("shutdown: called");
        self.session.shutdown();
        self.trips.shutdown().await;
    }
}
