//! TripPlanner - AI trip planning toolkit
//!
//! Signs a user in, turns a destination into an AI-generated day-by-day itinerary
//! and keeps saved trips per user.
//!
//! # Modules
//!
//! - [`retry`] - Bounded retry with linear back-off
//! - [`session`] - Session reconciliation against an identity provider
//! - [`places`] - Destination autocomplete with a curated fallback
//! - [`itinerary`] - Prompt construction, generation and sanitizing
//! - [`llm`] - Generation client trait and Gemini implementation
//! - [`trips`] - Saved trips actor over the trip store
//! - [`planner`] - Facade wiring the above together
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod itinerary;
pub mod llm;
pub mod places;
pub mod planner;
pub mod retry;
pub mod session;
pub mod trips;

// Re-export commonly used types
pub use config::Config;
pub use itinerary::{ItineraryRequester, ItineraryResult, TripParameters};
pub use llm::{GenerationClient, GenerationError, create_client};
pub use places::{DestinationResolver, PlaceCandidate, ResolverMode};
pub use planner::{PlanError, TripPlan, TripPlanner};
pub use retry::RetryPolicy;
pub use session::{AuthError, Identity, IdentityProvider, SessionReconciler, SessionState};
pub use trips::{PersistenceError, TripManager};
