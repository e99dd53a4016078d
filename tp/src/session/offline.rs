//! Identity provider used when no identity service is configured
//!
//! Always signed out. Planning still works; anything that needs a user does not.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::{AuthError, Identity, IdentityChange, IdentityProvider, SignInOptions};

pub struct OfflineIdentityProvider {
    reason: String,
    changes: broadcast::Sender<IdentityChange>,
}

impl OfflineIdentityProvider {
    /// `reason` is reported back from sign-in attempts
    pub fn new(reason: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(1);
        Self {
            reason: reason.into(),
            changes,
        }
    }
}

#[async_trait]
impl IdentityProvider for OfflineIdentityProvider {
    fn cached_identity(&self) -> Option<Identity> {
        None
    }

    async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
        debug!(uid = %identity.uid, "OfflineIdentityProvider::refresh: called");
        Err(AuthError::Unavailable(self.reason.clone()))
    }

    async fn sign_in(&self, _options: &SignInOptions) -> Result<Identity, AuthError> {
        Err(AuthError::Unavailable(self.reason.clone()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityChange> {
        self.changes.subscribe()
    }
}
