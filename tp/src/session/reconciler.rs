//! SessionReconciler - actor that owns the session state
//!
//! Startup validation, live notifications and the timeout timer all run as separate
//! tasks that only ever send typed events into one intake. The actor applies them in
//! arrival order and publishes the result on a watch channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::{
    AuthError, DEFAULT_PROMPT, Identity, IdentityChange, IdentityProvider, SessionEvent, SessionMachine, SessionState,
    SignInOptions,
};
use crate::config::SessionConfig;

/// How long startup waits for an identity before proceeding anonymously
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(4000);

const INTAKE_CAPACITY: usize = 64;

/// Reconciler settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub timeout: Duration,
    /// Account-selection hint for interactive sign-in
    pub prompt: String,
}

impl SessionSettings {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            prompt: config.prompt.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SESSION_TIMEOUT,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// Handle to the session actor
///
/// Dropping the handle shuts the actor down.
pub struct SessionReconciler {
    provider: Arc<dyn IdentityProvider>,
    intake: mpsc::Sender<SessionEvent>,
    state: watch::Receiver<SessionState>,
    prompt: String,
    live: Arc<AtomicBool>,
    tasks: Vec<AbortHandle>,
}

impl SessionReconciler {
    /// Start reconciling: subscribe, arm the timer and validate any cached identity
    pub fn start(provider: Arc<dyn IdentityProvider>, settings: SessionSettings) -> Self {
        debug!(timeout = ?settings.timeout, "SessionReconciler::start: called");
        let live = Arc::new(AtomicBool::new(true));
        let (intake, rx) = mpsc::channel(INTAKE_CAPACITY);

        let mut machine = SessionMachine::new();
        machine.start();
        let (state_tx, state) = watch::channel(machine.state().clone());

        // Subscribe before anything can sign in or out
        let changes = provider.subscribe();

        let timer = tokio::spawn(fire_timeout(intake.clone(), settings.timeout, live.clone())).abort_handle();
        let actor = tokio::spawn(actor_loop(
            machine,
            rx,
            state_tx,
            provider.clone(),
            timer.clone(),
            live.clone(),
        ))
        .abort_handle();
        let forwarder = tokio::spawn(forward_notifications(changes, intake.clone(), live.clone())).abort_handle();
        let mut tasks = vec![timer, actor, forwarder];

        match provider.cached_identity() {
            Some(cached) => {
                debug!(uid = %cached.uid, "SessionReconciler::start: validating cached identity");
                let validation = tokio::spawn(validate(provider.clone(), cached, intake.clone(), live.clone()));
                tasks.push(validation.abort_handle());
            }
            None => {
                // Nothing cached: the provider is signed out
                debug!("SessionReconciler::start: no cached identity");
                if intake.try_send(SessionEvent::NotificationReceived(None)).is_err() {
                    warn!("SessionReconciler::start: intake full, relying on timeout");
                }
            }
        }

        info!("SessionReconciler started");
        Self {
            provider,
            intake,
            state,
            prompt: settings.prompt,
            live,
            tasks,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Wait until the startup phase is over (resolved, anonymous or timed out)
    ///
    /// Returns the last known state if the reconciler is shut down first.
    pub async fn settled(&self) -> SessionState {
        debug!("settled: called");
        let mut rx = self.state.clone();
        if let Ok(state) = rx.wait_for(SessionState::is_settled).await {
            return state.clone();
        }
        self.state()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Sign-in options carrying the configured account-selection hint
    pub fn sign_in_options(&self) -> SignInOptions {
        SignInOptions::new(self.prompt.clone())
    }

    /// Interactive sign-in. Failures are returned as-is, never retried.
    pub async fn login(&self, options: SignInOptions) -> Result<Identity, AuthError> {
        debug!(?options, "login: called");
        let identity = self.provider.sign_in(&options).await?;
        info!(uid = %identity.uid, "Signed in");
        deliver(
            &self.intake,
            &self.live,
            SessionEvent::NotificationReceived(Some(identity.clone())),
        )
        .await;
        Ok(identity)
    }

    /// Sign out; succeeds when already signed out
    pub async fn logout(&self) -> Result<(), AuthError> {
        debug!("logout: called");
        self.provider.sign_out().await?;
        info!("Signed out");
        deliver(&self.intake, &self.live, SessionEvent::NotificationReceived(None)).await;
        Ok(())
    }

    /// Stop the actor, the timer and the notification subscription
    ///
    /// Safe to call any number of times.
    pub fn shutdown(&self) {
        debug!("shutdown: called");
        if !self.live.swap(false, Ordering::SeqCst) {
            debug!("shutdown: already shut down");
            return;
        }
        for task in &self.tasks {
            task.abort();
        }
        info!("SessionReconciler shut down");
    }
}

impl Drop for SessionReconciler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn deliver(intake: &mpsc::Sender<SessionEvent>, live: &AtomicBool, event: SessionEvent) {
    if !live.load(Ordering::SeqCst) {
        debug!(?event, "deliver: reconciler shut down, dropping event");
        return;
    }
    if intake.send(event).await.is_err() {
        debug!("deliver: actor gone");
    }
}

async fn actor_loop(
    mut machine: SessionMachine,
    mut rx: mpsc::Receiver<SessionEvent>,
    state_tx: watch::Sender<SessionState>,
    provider: Arc<dyn IdentityProvider>,
    timer: AbortHandle,
    live: Arc<AtomicBool>,
) {
    debug!("actor_loop: called");
    while let Some(event) = rx.recv().await {
        if !live.load(Ordering::SeqCst) {
            break;
        }
        debug!(?event, "actor_loop: event");

        if event == SessionEvent::ValidationFailed && machine.accepts_validation() {
            revoke(provider.as_ref()).await;
        }

        if machine.apply(event) {
            info!(state = %machine.state(), "Session state changed");
            state_tx.send_replace(machine.state().clone());
        }
        if machine.state().is_settled() {
            timer.abort();
        }
    }
    debug!("actor_loop: exiting");
}

async fn revoke(provider: &dyn IdentityProvider) {
    debug!("revoke: called");
    if let Err(e) = provider.sign_out().await {
        warn!(error = %e, "Failed to revoke stale session");
    }
}

async fn validate(
    provider: Arc<dyn IdentityProvider>,
    cached: Identity,
    intake: mpsc::Sender<SessionEvent>,
    live: Arc<AtomicBool>,
) {
    debug!(uid = %cached.uid, "validate: called");
    let event = match provider.refresh(&cached).await {
        Ok(identity) => {
            debug!(uid = %identity.uid, "validate: cached identity is valid");
            SessionEvent::ValidationSucceeded(identity)
        }
        Err(e) => {
            warn!(error = %e, uid = %cached.uid, "Cached identity failed validation");
            SessionEvent::ValidationFailed
        }
    };
    deliver(&intake, &live, event).await;
}

async fn fire_timeout(intake: mpsc::Sender<SessionEvent>, timeout: Duration, live: Arc<AtomicBool>) {
    tokio::time::sleep(timeout).await;
    debug!(?timeout, "fire_timeout: timer elapsed");
    deliver(&intake, &live, SessionEvent::TimedOut).await;
}

async fn forward_notifications(
    mut changes: broadcast::Receiver<IdentityChange>,
    intake: mpsc::Sender<SessionEvent>,
    live: Arc<AtomicBool>,
) {
    debug!("forward_notifications: called");
    loop {
        match changes.recv().await {
            Ok(change) => deliver(&intake, &live, SessionEvent::NotificationReceived(change)).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Identity notifications lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("forward_notifications: provider closed the stream");
                break;
            }
        }
    }
}
