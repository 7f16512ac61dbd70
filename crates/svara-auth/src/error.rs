//! Auth-specific error types.

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email or password failed local checks; nothing was sent.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The auth service refused the credentials.
    #[error("sign-in rejected: {0}")]
    Rejected(String),

    /// No session is available.
    #[error("not signed in")]
    NotSignedIn,

    /// The session expired and could not be refreshed.
    #[error("session has expired")]
    SessionExpired,

    /// The auth service could not be reached or answered with an error.
    #[error("auth service error: {message}")]
    Remote {
        /// HTTP status, when there was a response
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// Reading or writing the persisted session failed.
    #[error("session store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Creates a remote error without an HTTP status.
    pub fn remote<S: Into<String>>(message: S) -> Self {
        AuthError::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the user can fix this by changing their input or signing in.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials(_)
                | AuthError::Rejected(_)
                | AuthError::NotSignedIn
                | AuthError::SessionExpired
        )
    }
}
