//! Error types for svara-cli

use thiserror::Error;

/// Result type alias for svara-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in svara-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from svara-core
    #[error("{0}")]
    Core(#[from] svara_core::Error),

    /// Error from svara-auth
    #[error("{0}")]
    Auth(#[from] svara_auth::AuthError),

    /// Error from svara-admin
    #[error("{0}")]
    Admin(#[from] svara_admin::Error),

    /// The command needs a signed-in admin
    #[error("not signed in, run `svara auth sign-in` first")]
    NotSignedIn,

    /// Writing output or reading input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
