//! Trip manager messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;
use tripstore::{NewTrip, StoreError, TripRecord};

/// Errors from trip persistence
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Trip not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Channel error")]
    ChannelError,
}

impl From<StoreError> for PersistenceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => PersistenceError::NotFound(id),
            other => PersistenceError::StoreError(other.to_string()),
        }
    }
}

/// Response from trip operations
pub type PersistenceResponse<T> = Result<T, PersistenceError>;

/// Commands sent to the TripManager actor
#[derive(Debug)]
pub enum TripCommand {
    Create {
        uid: String,
        trip: NewTrip,
        reply: oneshot::Sender<PersistenceResponse<TripRecord>>,
    },
    List {
        uid: String,
        search: Option<String>,
        reply: oneshot::Sender<PersistenceResponse<Vec<TripRecord>>>,
    },
    Get {
        uid: String,
        id: String,
        reply: oneshot::Sender<PersistenceResponse<Option<TripRecord>>>,
    },
    UpdateNotes {
        uid: String,
        id: String,
        notes: String,
        reply: oneshot::Sender<PersistenceResponse<()>>,
    },
    Delete {
        uid: String,
        id: String,
        reply: oneshot::Sender<PersistenceResponse<bool>>,
    },
    Shutdown,
}
