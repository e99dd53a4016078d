//! Session state machine
//!
//! Pure transition logic. The reconciler feeds it events in arrival order; nothing
//! else writes session state.

use std::fmt;

use super::Identity;

/// Current authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unknown,
    Resolving,
    Resolved(Identity),
    Anonymous,
    /// Anonymous because nothing resolved within the wait budget
    TimedOut,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Resolved(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, SessionState::Anonymous | SessionState::TimedOut)
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, SessionState::TimedOut)
    }

    /// Whether the startup wait is over
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Unknown | SessionState::Resolving)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unknown => write!(f, "unknown"),
            SessionState::Resolving => write!(f, "resolving"),
            SessionState::Resolved(identity) => write!(f, "resolved({})", identity.uid),
            SessionState::Anonymous => write!(f, "anonymous"),
            SessionState::TimedOut => write!(f, "anonymous (timed out)"),
        }
    }
}

/// Inputs to the session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ValidationSucceeded(Identity),
    ValidationFailed,
    NotificationReceived(Option<Identity>),
    TimedOut,
}

/// Single-writer session state machine
///
/// Notifications are authoritative: once one has been applied, validation results
/// are ignored. A timeout only counts while still resolving.
#[derive(Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
    notified: bool,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Leave `Unknown`; has no effect once started
    pub fn start(&mut self) -> bool {
        if self.state == SessionState::Unknown {
            self.state = SessionState::Resolving;
            return true;
        }
        false
    }

    /// Whether a validation result would still be applied
    pub fn accepts_validation(&self) -> bool {
        !self.notified
    }

    /// Apply an event; returns true when the state changed
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        let next = match event {
            SessionEvent::NotificationReceived(change) => {
                self.notified = true;
                match change {
                    Some(identity) => SessionState::Resolved(identity),
                    None => SessionState::Anonymous,
                }
            }
            SessionEvent::ValidationSucceeded(identity) if self.accepts_validation() => {
                SessionState::Resolved(identity)
            }
            SessionEvent::ValidationFailed if self.accepts_validation() => SessionState::Anonymous,
            SessionEvent::TimedOut if !self.state.is_settled() => SessionState::TimedOut,
            _ => return false,
        };

        if next == self.state {
            return false;
        }
        self.state = next;
        true
    }
}
