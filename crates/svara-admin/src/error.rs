//! Error types for svara-admin

use std::time::Duration;

use thiserror::Error;

/// Result type alias for svara-admin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the admin core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from svara-core (validation, media rules, data service)
    #[error(transparent)]
    Core(#[from] svara_core::Error),

    /// Error from svara-auth
    #[error(transparent)]
    Auth(#[from] svara_auth::AuthError),

    /// The session gate stayed unresolved
    #[error("session state not resolved after {0:?}")]
    GateTimeout(Duration),

    /// Submit was called with no form open
    #[error("no client form is open")]
    FormClosed,
}

impl Error {
    /// Returns `true` for errors raised before anything was sent.
    pub fn is_local(&self) -> bool {
        match self {
            Self::Core(e) => matches!(
                e.category(),
                svara_core::ErrorCategory::Validation
            ),
            Self::Auth(svara_auth::AuthError::InvalidCredentials(_)) => true,
            Self::FormClosed => true,
            _ => false,
        }
    }
}
