//! Firebase Authentication REST provider
//!
//! Password sign-in and secure-token refresh against the public REST endpoints. The
//! signed-in credential is cached as JSON so the next run can validate it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use super::{AuthError, Identity, IdentityChange, IdentityProvider, SignInOptions};
use crate::config::SessionConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Credential cached between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    identity: Identity,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Identity provider backed by Firebase Authentication
pub struct FirebaseIdentityProvider {
    api_key: String,
    identity_url: String,
    token_url: String,
    project_number: Option<String>,
    credential_path: PathBuf,
    /// Bumped by every sign-in and sign-out; a refresh only writes back if it is unchanged
    epoch: Mutex<u64>,
    http: Client,
    changes: broadcast::Sender<IdentityChange>,
}

impl FirebaseIdentityProvider {
    /// Create a provider from configuration; fails when the web API key is not set
    pub fn from_config(config: &SessionConfig) -> Result<Self, AuthError> {
        debug!(credential_path = %config.credential_path.display(), "from_config: called");
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AuthError::Unavailable(format!("{} is not set", config.api_key_env)))?;

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let (changes, _) = broadcast::channel(16);

        Ok(Self {
            api_key,
            identity_url: config.identity_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.trim_end_matches('/').to_string(),
            project_number: Some(config.project_number.clone()).filter(|p| !p.is_empty()),
            credential_path: config.credential_path.clone(),
            epoch: Mutex::new(0),
            http,
            changes,
        })
    }

    pub fn credential_path(&self) -> &Path {
        &self.credential_path
    }

    fn load_credential(&self) -> Result<Option<StoredCredential>, AuthError> {
        match std::fs::read_to_string(&self.credential_path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store_credential(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        debug!(uid = %credential.identity.uid, "store_credential: called");
        if let Some(parent) = self.credential_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.credential_path, serde_json::to_string_pretty(credential)?)?;
        Ok(())
    }

    fn clear_credential(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.credential_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("clear_credential: nothing cached");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T, AuthError> {
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "post_json: request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Pull `error.message` out of an error body, falling back to the raw text
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn expiry_from(expires_in: &str) -> DateTime<Utc> {
    let secs = expires_in.parse().unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Utc::now() + chrono::Duration::seconds(secs)
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    fn cached_identity(&self) -> Option<Identity> {
        match self.load_credential() {
            Ok(credential) => credential.map(|c| c.identity),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable credential cache");
                None
            }
        }
    }

    async fn refresh(&self, identity: &Identity) -> Result<Identity, AuthError> {
        debug!(uid = %identity.uid, "refresh: called");
        let (started, credential) = {
            let epoch = self.epoch.lock().await;
            (*epoch, self.load_credential()?)
        };
        let credential = credential.ok_or_else(|| AuthError::Revoked("no cached credential".to_string()))?;
        if credential.identity.uid != identity.uid {
            return Err(AuthError::Revoked("cached credential belongs to another user".to_string()));
        }

        let body = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: &credential.refresh_token,
        };
        let url = format!("{}/v1/token", self.token_url);
        let token: TokenResponse = self.post_json(&url, &body).await?;

        if token.user_id != identity.uid {
            return Err(AuthError::Revoked(format!("token issued for {}", token.user_id)));
        }
        // The token endpoint reports the numeric project number in `project_id`
        if let (Some(expected), Some(actual)) = (&self.project_number, &token.project_id)
            && expected != actual
        {
            return Err(AuthError::Revoked(format!("token issued by project {}", actual)));
        }

        let epoch = self.epoch.lock().await;
        if *epoch != started {
            debug!(uid = %identity.uid, "refresh: session changed while refreshing");
            return Err(AuthError::Revoked("session changed during refresh".to_string()));
        }
        self.store_credential(&StoredCredential {
            identity: credential.identity.clone(),
            id_token: token.id_token,
            refresh_token: token.refresh_token,
            expires_at: expiry_from(&token.expires_in),
        })?;
        Ok(credential.identity)
    }

    async fn sign_in(&self, options: &SignInOptions) -> Result<Identity, AuthError> {
        debug!(prompt = %options.prompt, "sign_in: called");
        let (Some(email), Some(password)) = (&options.email, &options.password) else {
            return Err(AuthError::Unavailable(
                "account selection needs a browser; sign in with an email and password".to_string(),
            ));
        };

        let body = SignInRequest {
            email,
            password,
            return_secure_token: true,
        };
        let url = format!("{}/v1/accounts:signInWithPassword", self.identity_url);
        let response: SignInResponse = self.post_json(&url, &body).await?;
        let mut epoch = self.epoch.lock().await;
        *epoch += 1;

        let identity = Identity {
            uid: response.local_id,
            email: response.email.or_else(|| Some(email.clone())),
            display_name: response.display_name.filter(|n| !n.is_empty()),
        };
        self.store_credential(&StoredCredential {
            identity: identity.clone(),
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: expiry_from(&response.expires_in),
        })?;
        let _ = self.changes.send(Some(identity.clone()));
        drop(epoch);

        info!(uid = %identity.uid, "Signed in with password");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        debug!("sign_out: called");
        {
            let mut epoch = self.epoch.lock().await;
            *epoch += 1;
            self.clear_credential()?;
            let _ = self.changes.send(None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityChange> {
        self.changes.subscribe()
    }
}

// REST request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn provider(dir: &TempDir) -> FirebaseIdentityProvider {
        provider_with_token_url(dir, "https://securetoken.googleapis.com")
    }

    fn provider_with_token_url(dir: &TempDir, token_url: &str) -> FirebaseIdentityProvider {
        let (changes, _) = broadcast::channel(16);
        FirebaseIdentityProvider {
            api_key: "test-key".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            token_url: token_url.to_string(),
            project_number: None,
            credential_path: dir.path().join("auth").join("session.json"),
            epoch: Mutex::new(0),
            http: Client::new(),
            changes,
        }
    }

    fn token_body(uid: &str, project: &str) -> String {
        format!(
            r#"{{"expires_in":"3600","token_type":"Bearer","refresh_token":"r2","id_token":"i2","user_id":"{}","project_id":"{}"}}"#,
            uid, project
        )
    }

    /// Serve one token request; the reply is held until `release` fires
    async fn token_server(body: String) -> (String, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (received_tx, received_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"}") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let _ = received_tx.send(());
            let _ = release_rx.await;

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (url, received_rx, release_tx)
    }

    fn credential(uid: &str) -> StoredCredential {
        StoredCredential {
            identity: Identity::new(uid).with_email("a@example.com"),
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_cached_identity_round_trip() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        assert!(provider.cached_identity().is_none());

        provider.store_credential(&credential("u1")).unwrap();
        let identity = provider.cached_identity().unwrap();
        assert_eq!(identity.uid, "u1");
        assert_eq!(identity.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        std::fs::create_dir_all(provider.credential_path().parent().unwrap()).unwrap();
        std::fs::write(provider.credential_path(), "not json").unwrap();
        assert!(provider.cached_identity().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache_and_notifies() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        provider.store_credential(&credential("u1")).unwrap();
        let mut changes = provider.subscribe();

        provider.sign_out().await.unwrap();
        assert!(provider.cached_identity().is_none());
        assert_eq!(changes.recv().await.unwrap(), None);

        // Already signed out
        provider.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_sign_in_without_credentials_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = provider(&dir).sign_in(&SignInOptions::default()).await.unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_refresh_without_cache_is_revoked() {
        let dir = TempDir::new().unwrap();
        let err = provider(&dir).refresh(&Identity::new("u1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked(_)));
    }

    #[tokio::test]
    async fn test_refresh_for_other_user_is_revoked() {
        let dir = TempDir::new().unwrap();
        let provider = provider(&dir);
        provider.store_credential(&credential("u1")).unwrap();
        let err = provider.refresh(&Identity::new("u2")).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked(_)));
    }

    #[tokio::test]
    async fn test_refresh_stores_new_token() {
        let dir = TempDir::new().unwrap();
        let (url, _received, release) = token_server(token_body("u1", "808581986899")).await;
        let mut provider = provider_with_token_url(&dir, &url);
        provider.project_number = Some("808581986899".to_string());
        provider.store_credential(&credential("u1")).unwrap();
        release.send(()).unwrap();

        let identity = provider.refresh(&Identity::new("u1")).await.unwrap();
        assert_eq!(identity.uid, "u1");
        let stored = provider.load_credential().unwrap().unwrap();
        assert_eq!(stored.refresh_token, "r2");
        assert_eq!(stored.id_token, "i2");
    }

    #[tokio::test]
    async fn test_refresh_from_other_project_is_revoked() {
        let dir = TempDir::new().unwrap();
        let (url, _received, release) = token_server(token_body("u1", "111")).await;
        let mut provider = provider_with_token_url(&dir, &url);
        provider.project_number = Some("808581986899".to_string());
        provider.store_credential(&credential("u1")).unwrap();
        release.send(()).unwrap();

        let err = provider.refresh(&Identity::new("u1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked(_)));
    }

    #[tokio::test]
    async fn test_sign_out_during_refresh_is_not_undone() {
        let dir = TempDir::new().unwrap();
        let (url, received, release) = token_server(token_body("u1", "808581986899")).await;
        let provider = Arc::new(provider_with_token_url(&dir, &url));
        provider.store_credential(&credential("u1")).unwrap();

        let refreshing = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.refresh(&Identity::new("u1")).await })
        };
        received.await.unwrap();

        provider.sign_out().await.unwrap();
        assert!(provider.cached_identity().is_none());
        release.send(()).unwrap();

        let err = refreshing.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthError::Revoked(_)));
        assert!(provider.cached_identity().is_none());
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error":{"code":400,"message":"TOKEN_EXPIRED","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(body), "TOKEN_EXPIRED");
        assert_eq!(extract_error_message("Bad gateway\n"), "Bad gateway");
    }

    #[test]
    fn test_parse_token_response() {
        let raw = r#"{"expires_in":"3600","token_type":"Bearer","refresh_token":"r2","id_token":"i2","user_id":"u1","project_id":"123"}"#;
        let token: TokenResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(token.user_id, "u1");
        assert_eq!(token.project_id.as_deref(), Some("123"));
        assert!(expiry_from(&token.expires_in) > Utc::now());
    }

    #[test]
    fn test_parse_sign_in_response() {
        let raw = r#"{"localId":"u1","email":"a@example.com","displayName":"","idToken":"i","refreshToken":"r","expiresIn":"3600","registered":true}"#;
        let response: SignInResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.local_id, "u1");
        assert_eq!(response.display_name.as_deref(), Some(""));
    }
}
