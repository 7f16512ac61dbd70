//! Sessions, credentials and auth change events.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::AuthError;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Refresh this long before the access token actually expires.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Capacity of the auth event channel.
const EVENT_CAPACITY: usize = 16;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Unique user id assigned by the auth service.
    pub id: String,
    /// The user's email address.
    pub email: String,
}

/// Email and password as typed on the sign-in form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Creates credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Local checks run before anything is sent.
    pub fn validate(&self) -> Result<(), AuthError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidCredentials("email is required".into()));
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidCredentials(format!(
                "'{email}' is not an email address"
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidCredentials(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// An authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated calls.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: String,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: AuthUser,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Returns `true` once the access token is within [`EXPIRY_MARGIN`] of expiry.
    pub fn is_expired(&self) -> bool {
        let margin = chrono::Duration::from_std(EXPIRY_MARGIN).unwrap_or(chrono::Duration::zero());
        Utc::now() + margin >= self.expires_at
    }
}

/// Result of a sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is live and a session was opened.
    SignedIn(Session),
    /// The service sent a confirmation email; no session yet.
    ConfirmationPending {
        /// Address the confirmation was sent to.
        email: String,
    },
}

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    /// A session was opened.
    SignedIn,
    /// The session was closed.
    SignedOut,
    /// The access token was renewed.
    TokenRefreshed,
}

/// Notification published on every session change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    /// What changed.
    pub kind: AuthEventKind,
    /// Session after the change (`None` after sign-out).
    pub session: Option<Session>,
}

impl AuthEvent {
    /// User of the session after the change.
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }
}

/// Sending half of the auth change stream.
///
/// Providers own one and publish through it; observers call
/// [`AuthEvents::subscribe`].
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    /// Creates a stream with no subscribers.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn emit(&self, kind: AuthEventKind, session: Option<Session>) {
        log::debug!("Auth event: {kind:?}");
        let _ = self.tx.send(AuthEvent { kind, session });
    }

    /// Starts receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}
