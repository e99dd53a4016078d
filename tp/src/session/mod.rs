//! Session reconciliation
//!
//! Decides who the current user is at startup and keeps that answer current as the
//! identity provider reports sign-ins and sign-outs.

mod error;
mod firebase;
pub mod identity;
mod offline;
mod reconciler;
mod state;

pub use error::AuthError;
pub use firebase::FirebaseIdentityProvider;
pub use identity::{DEFAULT_PROMPT, Identity, IdentityChange, IdentityProvider, SignInOptions};
pub use offline::OfflineIdentityProvider;
pub use reconciler::{DEFAULT_SESSION_TIMEOUT, SessionReconciler, SessionSettings};
pub use state::{SessionEvent, SessionMachine, SessionState};
