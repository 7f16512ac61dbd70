//! In-process auth provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::{
    AuthError, AuthEvent, AuthEventKind, AuthEvents, AuthProvider, AuthUser, Credentials, Session,
    SignUpOutcome,
};

struct Account {
    id: String,
    password: String,
}

/// Auth provider holding accounts and the session in memory.
///
/// Useful for exercising session-dependent code without an auth service.
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    session: Mutex<Option<Session>>,
    events: AuthEvents,
    require_confirmation: bool,
    fail_lookup: AtomicBool,
    session_ttl: chrono::Duration,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    /// Creates a provider with no accounts.
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events: AuthEvents::new(),
            require_confirmation: false,
            fail_lookup: AtomicBool::new(false),
            session_ttl: chrono::Duration::hours(1),
        }
    }

    /// Adds an account.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        let id = format!("user-{}", self.lock_accounts().len() + 1);
        self.lock_accounts().insert(
            email.to_string(),
            Account {
                id,
                password: password.to_string(),
            },
        );
        self
    }

    /// Makes sign-up wait for email confirmation instead of signing in.
    pub fn requiring_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Makes `current_session` fail (or succeed again).
    pub fn fail_session_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    /// Moves the current session's expiry into the past.
    pub fn expire_session(&self) {
        if let Some(session) = self.lock_session().as_mut() {
            session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    /// Issues new tokens for the current session and publishes the refresh.
    pub fn refresh(&self) -> Result<Session, AuthError> {
        let refreshed = {
            let mut guard = self.lock_session();
            let session = guard.as_mut().ok_or(AuthError::NotSignedIn)?;
            session.access_token = token("access");
            session.refresh_token = token("refresh");
            session.expires_at = Utc::now() + self.session_ttl;
            session.clone()
        };
        self.events
            .emit(AuthEventKind::TokenRefreshed, Some(refreshed.clone()));
        Ok(refreshed)
    }

    fn open_session(&self, user: AuthUser) -> Session {
        let session = Session {
            access_token: token("access"),
            refresh_token: token("refresh"),
            expires_at: Utc::now() + self.session_ttl,
            user,
        };
        *self.lock_session() = Some(session.clone());
        self.events
            .emit(AuthEventKind::SignedIn, Some(session.clone()));
        session
    }

    fn lock_accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn token(kind: &str) -> String {
    format!("{kind}-{}", uuid::Uuid::new_v4().simple())
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        credentials.validate()?;
        let email = credentials.email.trim().to_string();
        let user = {
            let mut accounts = self.lock_accounts();
            if accounts.contains_key(&email) {
                return Err(AuthError::Rejected("User already registered".into()));
            }
            let id = format!("user-{}", accounts.len() + 1);
            accounts.insert(
                email.clone(),
                Account {
                    id: id.clone(),
                    password: credentials.password.clone(),
                },
            );
            AuthUser { id, email }
        };

        if self.require_confirmation {
            return Ok(SignUpOutcome::ConfirmationPending { email: user.email });
        }
        Ok(SignUpOutcome::SignedIn(self.open_session(user)))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;
        let email = credentials.email.trim();
        let user = {
            let accounts = self.lock_accounts();
            match accounts.get(email) {
                Some(account) if account.password == credentials.password => AuthUser {
                    id: account.id.clone(),
                    email: email.to_string(),
                },
                _ => return Err(AuthError::Rejected("Invalid login credentials".into())),
            }
        };
        Ok(self.open_session(user))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.lock_session() = None;
        self.events.emit(AuthEventKind::SignedOut, None);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(AuthError::remote("session lookup failed"));
        }
        let expired = match self.lock_session().as_ref() {
            None => return Ok(None),
            Some(session) => session.is_expired(),
        };
        if expired {
            return self.refresh().map(Some);
        }
        Ok(self.lock_session().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
