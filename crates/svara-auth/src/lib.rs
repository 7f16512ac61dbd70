//! Authentication primitives for the Švara admin tools.
//!
//! Provides:
//! - [`Credentials`], [`Session`], [`AuthUser`]: who is signed in
//! - [`AuthProvider`]: trait for email/password auth services
//! - [`AuthEvents`] / [`AuthEvent`]: the auth change stream
//! - [`SessionStore`]: persistence of the session between runs
//! - [`MemoryAuth`]: in-process provider
//! - [`AuthError`]: auth-specific error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod session;
mod store;

pub use error::AuthError;
pub use memory::MemoryAuth;
pub use session::{
    AuthEvent, AuthEventKind, AuthEvents, AuthUser, Credentials, EXPIRY_MARGIN, MIN_PASSWORD_LEN,
    Session, SignUpOutcome,
};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Email/password authentication service.
///
/// Every state change (sign-in, sign-out, token refresh) is published on the
/// stream returned by [`AuthProvider::subscribe`].
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a new account.
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError>;

    /// Opens a session.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// Closes the current session. Local state is cleared even when the
    /// remote call fails.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The current session, refreshed first if it has expired.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Subscribes to session changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
