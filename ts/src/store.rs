//! SQLite-backed trip store
//!
//! One table holds every user's trips; all queries are scoped by user id so callers
//! only ever see their own collection.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::record::{NewTrip, TripImages, TripRecord};

const DB_FILE: &str = "trips.sqlite";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS trips (
    id           TEXT PRIMARY KEY,
    uid          TEXT NOT NULL,
    destination  TEXT NOT NULL,
    itinerary    TEXT NOT NULL,
    image_main   TEXT NOT NULL,
    image_travel TEXT NOT NULL,
    notes        TEXT,
    timestamp    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS trips_uid_timestamp ON trips (uid, timestamp);
";

const SELECT_COLUMNS: &str = "id, destination, itinerary, image_main, image_travel, notes, timestamp";

/// Trip store owning a single SQLite connection
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the store inside the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        debug!(dir = %dir.display(), "Store::open: called");
        fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join(DB_FILE))?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %dir.join(DB_FILE).display(), "Opened trip store");
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        debug!("Store::open_in_memory: called");
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Save a new trip for a user, assigning its id and creation timestamp
    pub fn create(&self, uid: &str, trip: NewTrip) -> Result<TripRecord> {
        debug!(%uid, destination = %trip.destination, "Store::create: called");
        let record = TripRecord {
            id: uuid::Uuid::now_v7().to_string(),
            destination: trip.destination,
            itinerary: trip.itinerary,
            images: trip.images,
            notes: None,
            // Stored with microsecond precision
            timestamp: Utc::now().trunc_subsecs(6),
        };

        self.conn.execute(
            "INSERT INTO trips (id, uid, destination, itinerary, image_main, image_travel, notes, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
            rusqlite::params![
                &record.id,
                uid,
                &record.destination,
                &record.itinerary,
                &record.images.main,
                &record.images.travel,
                format_timestamp(&record.timestamp),
            ],
        )?;

        debug!(id = %record.id, "Store::create: inserted");
        Ok(record)
    }

    /// List a user's trips, newest first
    pub fn list(&self, uid: &str) -> Result<Vec<TripRecord>> {
        debug!(%uid, "Store::list: called");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM trips WHERE uid = ?1 ORDER BY timestamp DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([uid], read_row)?;

        let mut trips = Vec::new();
        for row in rows {
            trips.push(row??);
        }
        debug!(count = trips.len(), "Store::list: loaded");
        Ok(trips)
    }

    /// Read a single trip
    pub fn get(&self, uid: &str, id: &str) -> Result<Option<TripRecord>> {
        debug!(%uid, %id, "Store::get: called");
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM trips WHERE uid = ?1 AND id = ?2"),
                [uid, id],
                read_row,
            )
            .optional()?;
        row.transpose()
    }

    /// Replace the notes on an existing trip
    pub fn update_notes(&self, uid: &str, id: &str, notes: &str) -> Result<()> {
        debug!(%uid, %id, notes_len = notes.len(), "Store::update_notes: called");
        let rows = self.conn.execute(
            "UPDATE trips SET notes = ?1 WHERE uid = ?2 AND id = ?3",
            rusqlite::params![notes, uid, id],
        )?;
        if rows == 0 {
            debug!(%id, "Store::update_notes: no such trip");
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete a trip; returns whether a record was removed
    pub fn delete(&self, uid: &str, id: &str) -> Result<bool> {
        debug!(%uid, %id, "Store::delete: called");
        let rows = self
            .conn
            .execute("DELETE FROM trips WHERE uid = ?1 AND id = ?2", [uid, id])?;
        Ok(rows > 0)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Map a row to a record; parse failures surface as `Corrupt` rather than SQLite errors
fn read_row(row: &Row<'_>) -> rusqlite::Result<Result<TripRecord>> {
    let timestamp: String = row.get(6)?;
    let record = DateTime::parse_from_rfc3339(&timestamp)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid timestamp '{}': {}", timestamp, e)));

    Ok(match record {
        Ok(timestamp) => Ok(TripRecord {
            id: row.get(0)?,
            destination: row.get(1)?,
            itinerary: row.get(2)?,
            images: TripImages {
                main: row.get(3)?,
                travel: row.get(4)?,
            },
            notes: row.get(5)?,
            timestamp,
        }),
        Err(e) => Err(e),
    })
}
