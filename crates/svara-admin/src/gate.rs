//! Session gate.
//!
//! [`SessionGate`] decides whether the sign-in view or the admin panel is
//! shown. It looks up the current session once, then follows the auth
//! provider's change stream in a background task and publishes its state
//! through a watch channel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use svara_auth::{AuthEvent, AuthEventKind, AuthProvider, AuthUser};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Authentication state as seen by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// The initial session lookup has not finished.
    Resolving,
    /// A user is signed in.
    Authenticated(AuthUser),
    /// Nobody is signed in.
    Anonymous,
}

impl GateState {
    /// Returns `true` once the initial lookup has finished.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Resolving)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolving => write!(f, "resolving"),
            Self::Authenticated(user) => write!(f, "signed in as {}", user.email),
            Self::Anonymous => write!(f, "signed out"),
        }
    }
}

/// Which view to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Loading indicator.
    Loading,
    /// The public sign-in form.
    SignIn,
    /// The admin panel.
    AdminPanel,
}

impl From<&GateState> for GateView {
    fn from(state: &GateState) -> Self {
        match state {
            GateState::Resolving => Self::Loading,
            GateState::Authenticated(_) => Self::AdminPanel,
            GateState::Anonymous => Self::SignIn,
        }
    }
}

/// Follows the auth state of one provider.
///
/// The background task ends when the gate is shut down or dropped.
pub struct SessionGate {
    tx: Arc<watch::Sender<GateState>>,
    task: JoinHandle<()>,
}

impl SessionGate {
    /// Starts following `auth`. Must be called inside a tokio runtime.
    pub fn spawn(auth: Arc<dyn AuthProvider>) -> Self {
        // Subscribe before the lookup so no change between the two is lost.
        let events = auth.subscribe();
        let (tx, _rx) = watch::channel(GateState::Resolving);
        let tx = Arc::new(tx);
        let task = tokio::spawn(follow(auth, events, Arc::clone(&tx)));
        Self { tx, task }
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.tx.borrow().clone()
    }

    /// View to present for the current state.
    pub fn view(&self) -> GateView {
        GateView::from(&*self.tx.borrow())
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<AuthUser> {
        self.tx.borrow().user().cloned()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.tx.subscribe()
    }

    /// Waits until the initial lookup has finished, or timeout.
    pub async fn wait_resolved(&self, timeout: Duration) -> Result<GateState> {
        let mut rx = self.subscribe();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        {
            let state = rx.borrow_and_update().clone();
            if state.is_resolved() {
                return Ok(state);
            }
        }

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    return Err(Error::GateTimeout(timeout));
                }
                result = rx.changed() => {
                    if result.is_err() {
                        return Err(Error::GateTimeout(timeout));
                    }
                    let state = rx.borrow().clone();
                    if state.is_resolved() {
                        return Ok(state);
                    }
                }
            }
        }
    }

    /// Stops following the provider.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGate")
            .field("state", &self.state())
            .finish()
    }
}

async fn lookup(auth: &dyn AuthProvider) -> GateState {
    match auth.current_session().await {
        Ok(Some(session)) => GateState::Authenticated(session.user),
        Ok(None) => GateState::Anonymous,
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed, treating as signed out");
            GateState::Anonymous
        }
    }
}

fn publish(tx: &watch::Sender<GateState>, state: GateState) {
    tracing::debug!(%state, "Session gate");
    tx.send_replace(state);
}

fn apply(event: &AuthEvent, current: &GateState) -> GateState {
    match (event.kind, event.user()) {
        (AuthEventKind::SignedIn | AuthEventKind::TokenRefreshed, Some(user)) => {
            GateState::Authenticated(user.clone())
        }
        (AuthEventKind::SignedIn | AuthEventKind::TokenRefreshed, None) => current.clone(),
        (AuthEventKind::SignedOut, _) => GateState::Anonymous,
    }
}

async fn follow(
    auth: Arc<dyn AuthProvider>,
    mut events: broadcast::Receiver<AuthEvent>,
    tx: Arc<watch::Sender<GateState>>,
) {
    publish(&tx, lookup(auth.as_ref()).await);

    loop {
        match events.recv().await {
            Ok(event) => {
                let next = apply(&event, &tx.borrow());
                publish(&tx, next);
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Auth events lagged, looking up session again");
                publish(&tx, lookup(auth.as_ref()).await);
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Auth event stream closed");
                break;
            }
        }
    }
}
