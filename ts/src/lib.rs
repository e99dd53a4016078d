//! TripStore - per-user trip record persistence
//!
//! Every signed-in user owns a collection of saved trips. Records are created with a
//! store-assigned timestamp, listed newest first, and only the notes field is mutable
//! after creation.
//!
//! The store is synchronous and owns a single SQLite connection; async callers wrap it
//! in an actor task rather than sharing it across threads.

mod error;
mod record;
mod store;

pub use error::{Result, StoreError};
pub use record::{NewTrip, TripImages, TripRecord};
pub use store::Store;
