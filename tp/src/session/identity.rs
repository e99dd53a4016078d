//! Identity types and the IdentityProvider trait

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::AuthError;

/// Account-selection hint used when none is configured
pub const DEFAULT_PROMPT: &str = "select_account";

/// A signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Best human-readable label: display name, then email, then uid
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// An identity-change notification: the new identity, or `None` when signed out
pub type IdentityChange = Option<Identity>;

/// Options for an interactive sign-in
#[derive(Clone)]
pub struct SignInOptions {
    /// Account-selection hint
    pub prompt: String,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SignInOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            email: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }
}

impl Default for SignInOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

impl fmt::Debug for SignInOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInOptions")
            .field("prompt", &self.prompt)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity cached from a previous run, if any. Not validated.
    fn cached_identity(&self) -> Option<Identity>;

    /// Force a token refresh for `identity`, failing if the session is no longer valid
    async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError>;

    /// Interactive sign-in
    async fn sign_in(&self, options: &SignInOptions) -> Result<Identity, AuthError>;

    /// Sign out; succeeds when already signed out
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Stream of identity changes made through this provider
    fn subscribe(&self) -> broadcast::Receiver<IdentityChange>;
}
