//! Saved trips, per user

mod manager;
mod messages;

pub use manager::TripManager;
pub use messages::{PersistenceError, PersistenceResponse, TripCommand};
