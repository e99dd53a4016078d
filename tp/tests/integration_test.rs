//! End-to-end flows through the public API with scripted collaborators

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tripplanner::itinerary::{ItineraryRequester, TripParameters};
use tripplanner::llm::{GenerationClient, GenerationError, GenerationRequest, GenerationResponse};
use tripplanner::places::{DestinationResolver, PlaceCandidate, filter_destinations};
use tripplanner::planner::TripPlanner;
use tripplanner::retry::RetryPolicy;
use tripplanner::session::{
    AuthError, Identity, IdentityChange, IdentityProvider, SessionReconciler, SessionSettings, SessionState,
    SignInOptions,
};
use tripplanner::trips::TripManager;

/// Fails the first `failures` calls with a 503, then answers with `text`
struct FlakyClient {
    failures: usize,
    text: String,
    prompts: Mutex<Vec<String>>,
}

impl FlakyClient {
    fn new(failures: usize, text: &str) -> Self {
        Self {
            failures,
            text: text.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for FlakyClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(request.prompt);
        if prompts.len() <= self.failures {
            return Err(GenerationError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            });
        }
        Ok(GenerationResponse::text(self.text.clone()))
    }
}

/// Provider with a fixed cached identity that either validates or not
struct ScriptedProvider {
    cached: Option<Identity>,
    valid: bool,
    sign_outs: AtomicUsize,
    changes: broadcast::Sender<IdentityChange>,
}

impl ScriptedProvider {
    fn new(cached: Option<Identity>, valid: bool) -> Self {
        let (changes, _) = broadcast::channel(8);
        Self {
            cached,
            valid,
            sign_outs: AtomicUsize::new(0),
            changes,
        }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn cached_identity(&self) -> Option<Identity> {
        self.cached.clone()
    }

    async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if self.valid {
            Ok(identity.clone())
        } else {
            Err(AuthError::Revoked("USER_DISABLED".to_string()))
        }
    }

    async fn sign_in(&self, _options: &SignInOptions) -> Result<Identity, AuthError> {
        Err(AuthError::Unavailable("not scripted".to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        let _ = self.changes.send(None);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityChange> {
        self.changes.subscribe()
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(800))
}

#[tokio::test(start_paused = true)]
async fn test_tokyo_itinerary_survives_one_transient_failure() {
    let client = Arc::new(FlakyClient::new(1, "**Day 1**\n- Explore #Shibuya\n\n## Day 2\n> Hike Mt. Takao"));
    let requester = ItineraryRequester::new(client.clone(), fast_retry());

    let place = PlaceCandidate::named("Tokyo, Japan");
    let params = TripParameters::new(NonZeroU32::new(5).unwrap(), "adventure", "solo");
    let result = requester.generate(&place, &params).await.unwrap();

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 2);
    for prompt in &prompts {
        assert!(prompt.contains("Tokyo, Japan"));
        assert!(prompt.contains('5'));
        assert!(prompt.contains("adventure"));
        assert!(prompt.contains("solo"));
    }
    assert_eq!(result.text(), "Day 1\nExplore Shibuya\n\nDay 2\nHike Mt. Takao");
}

#[tokio::test(start_paused = true)]
async fn test_generation_gives_up_with_last_error() {
    let client = Arc::new(FlakyClient::new(usize::MAX, "never"));
    let requester = ItineraryRequester::new(client.clone(), fast_retry());

    let err = requester
        .generate(&PlaceCandidate::named("Oslo, Norway"), &TripParameters::default())
        .await
        .unwrap_err();

    assert_eq!(client.prompts().len(), 3);
    assert_eq!(err.status(), Some(503));
}

#[test]
fn test_fallback_filter_par() {
    let matches = filter_destinations("par");
    assert!(matches.contains(&"Paris, France"));
    assert!(matches.iter().all(|d| d.to_lowercase().contains("par")));
}

#[tokio::test(start_paused = true)]
async fn test_stale_session_signs_out_and_blocks_saving() {
    let provider = Arc::new(ScriptedProvider::new(Some(Identity::new("alice")), false));
    let session = SessionReconciler::start(provider.clone(), SessionSettings::default());
    let planner = TripPlanner::new(
        session,
        DestinationResolver::fallback_only(),
        ItineraryRequester::new(Arc::new(FlakyClient::new(0, "Day 1")), fast_retry()),
        TripManager::spawn_in_memory().unwrap(),
    );

    assert_eq!(planner.session().settled().await, SessionState::Anonymous);
    assert_eq!(provider.sign_outs.load(Ordering::SeqCst), 1);

    let plan = planner
        .plan(&PlaceCandidate::named("Bali, Indonesia"), &TripParameters::default())
        .await
        .unwrap();
    let err = planner.save(&plan).await.unwrap_err();
    assert_eq!(err.to_string(), "Log in to save trips");
    planner.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_valid_session_plans_and_saves() {
    let provider = Arc::new(ScriptedProvider::new(Some(Identity::new("alice")), true));
    let session = SessionReconciler::start(provider, SessionSettings::default());
    let mut planner = TripPlanner::new(
        session,
        DestinationResolver::fallback_only(),
        ItineraryRequester::new(Arc::new(FlakyClient::new(0, "Day 1\nSagrada Familia")), fast_retry()),
        TripManager::spawn_in_memory().unwrap(),
    );

    let state = planner.session().settled().await;
    assert_eq!(state.identity().map(|i| i.uid.as_str()), Some("alice"));

    let place = planner.resolve_destination("Barcelona, Spain").await.unwrap();
    let plan = planner.plan(&place, &TripParameters::default()).await.unwrap();
    let record = planner.save(&plan).await.unwrap();

    let trips = planner.trips().list("alice", Some("barcelona")).await.unwrap();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, record.id);
    assert_eq!(trips[0].itinerary, "Day 1\nSagrada Familia");
    assert!(trips[0].images.main.contains("Barcelona"));
    planner.shutdown().await;
}
