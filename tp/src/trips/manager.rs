//! TripManager - actor that owns the trip store
//!
//! The SQLite connection lives on the actor task; callers talk to it over a channel.

use std::path::Path;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use tripstore::{NewTrip, Store, TripRecord};

use super::messages::{PersistenceError, PersistenceResponse, TripCommand};

const COMMAND_CAPACITY: usize = 64;

/// Handle to send commands to the TripManager
#[derive(Clone)]
pub struct TripManager {
    tx: mpsc::Sender<TripCommand>,
}

impl TripManager {
    /// Spawn a TripManager over the store in `dir`
    pub fn spawn(dir: impl AsRef<Path>) -> PersistenceResponse<Self> {
        debug!(dir = %dir.as_ref().display(), "spawn: called");
        let store = Store::open(dir.as_ref())?;
        Ok(Self::with_store(store))
    }

    /// Spawn a TripManager over a throwaway in-memory store
    pub fn spawn_in_memory() -> PersistenceResponse<Self> {
        debug!("spawn_in_memory: called");
        Ok(Self::with_store(Store::open_in_memory()?))
    }

    fn with_store(store: Store) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        tokio::spawn(actor_loop(store, rx));
        info!("TripManager spawned");
        Self { tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<PersistenceResponse<T>>) -> TripCommand,
    ) -> PersistenceResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| PersistenceError::ChannelError)?;
        reply_rx.await.map_err(|_| PersistenceError::ChannelError)?
    }

    /// Save a new trip for `uid`; the store assigns id and timestamp
    pub async fn create(&self, uid: &str, trip: NewTrip) -> PersistenceResponse<TripRecord> {
        debug!(%uid, destination = %trip.destination, "create: called");
        self.request(|reply| TripCommand::Create {
            uid: uid.to_string(),
            trip,
            reply,
        })
        .await
    }

    /// Trips for `uid`, newest first, optionally filtered by destination
    pub async fn list(&self, uid: &str, search: Option<&str>) -> PersistenceResponse<Vec<TripRecord>> {
        debug!(%uid, ?search, "list: called");
        self.request(|reply| TripCommand::List {
            uid: uid.to_string(),
            search: search.map(str::to_string),
            reply,
        })
        .await
    }

    pub async fn get(&self, uid: &str, id: &str) -> PersistenceResponse<Option<TripRecord>> {
        debug!(%uid, %id, "get: called");
        self.request(|reply| TripCommand::Get {
            uid: uid.to_string(),
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// Get a trip, treating absence as an error
    pub async fn get_required(&self, uid: &str, id: &str) -> PersistenceResponse<TripRecord> {
        self.get(uid, id)
            .await?
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    pub async fn update_notes(&self, uid: &str, id: &str, notes: &str) -> PersistenceResponse<()> {
        debug!(%uid, %id, "update_notes: called");
        self.request(|reply| TripCommand::UpdateNotes {
            uid: uid.to_string(),
            id: id.to_string(),
            notes: notes.to_string(),
            reply,
        })
        .await
    }

    /// Delete a trip; returns false when there was nothing to delete
    pub async fn delete(&self, uid: &str, id: &str) -> PersistenceResponse<bool> {
        debug!(%uid, %id, "delete: called");
        self.request(|reply| TripCommand::Delete {
            uid: uid.to_string(),
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// Stop the actor; later requests fail with `ChannelError`
    pub async fn shutdown(&self) {
        debug!("shutdown: called");
        let _ = self.tx.send(TripCommand::Shutdown).await;
    }
}

async fn actor_loop(store: Store, mut rx: mpsc::Receiver<TripCommand>) {
    debug!("actor_loop: called");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            TripCommand::Create { uid, trip, reply } => {
                debug!(%uid, "actor_loop: Create command");
                let _ = reply.send(store.create(&uid, trip).map_err(Into::into));
            }

            TripCommand::List { uid, search, reply } => {
                debug!(%uid, ?search, "actor_loop: List command");
                let result = store.list(&uid).map_err(PersistenceError::from).map(|trips| match &search {
                    Some(query) => trips.into_iter().filter(|t| t.matches(query)).collect(),
                    None => trips,
                });
                let _ = reply.send(result);
            }

            TripCommand::Get { uid, id, reply } => {
                debug!(%uid, %id, "actor_loop: Get command");
                let _ = reply.send(store.get(&uid, &id).map_err(Into::into));
            }

            TripCommand::UpdateNotes { uid, id, notes, reply } => {
                debug!(%uid, %id, "actor_loop: UpdateNotes command");
                let _ = reply.send(store.update_notes(&uid, &id, &notes).map_err(Into::into));
            }

            TripCommand::Delete { uid, id, reply } => {
                debug!(%uid, %id, "actor_loop: Delete command");
                let _ = reply.send(store.delete(&uid, &id).map_err(Into::into));
            }

            TripCommand::Shutdown => {
                info!("TripManager shutting down");
                break;
            }
        }
    }

    debug!("actor_loop: exiting");
}
