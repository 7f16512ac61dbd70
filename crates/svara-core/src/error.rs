//! Error types for svara-core.

use std::fmt;

/// Remote collaborator that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteService {
    /// Row store (the `clients` table).
    Table,
    /// Object store (the `cars` bucket).
    Storage,
    /// Authentication service.
    Auth,
}

impl fmt::Display for RemoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Storage => write!(f, "storage"),
            Self::Auth => write!(f, "auth"),
        }
    }
}

/// Why an image was refused before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    /// Content type does not start with `image/`.
    NotAnImage {
        /// Content type that was supplied.
        content_type: String,
    },
    /// File is larger than the configured ceiling.
    TooLarge {
        /// Size of the supplied file in bytes.
        size: u64,
        /// Ceiling in bytes.
        limit: u64,
    },
    /// File has no content.
    Empty,
}

impl fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnImage { content_type } => {
                write!(f, "please choose an image (got '{content_type}')")
            }
            Self::TooLarge { size, limit } => write!(
                f,
                "image is too large ({size} bytes), maximum size is {}",
                human_size(*limit)
            ),
            Self::Empty => write!(f, "image file is empty"),
        }
    }
}

fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Broad class of an error, used to decide how it is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Local input problem; blocks the action before any network call.
    Validation,
    /// Remote call failed; the action is abandoned.
    Remote,
    /// Anything else (configuration, I/O, decoding).
    Internal,
}

/// Errors that can occur in svara operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Required field missing or malformed.
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Image refused by the media rules.
    #[error("Image rejected: {0}")]
    ImageRejected(ImageRejection),

    /// A call to the remote data service failed.
    #[error("Remote {service} error: {message}")]
    Remote {
        /// Which service failed
        service: RemoteService,
        /// HTTP status, when the failure came with one
        status: Option<u16>,
        /// Error message reported by the service or transport
        message: String,
    },

    /// Record or object does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing thing
        what: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failed operation
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a remote error without an HTTP status.
    pub fn remote<S: Into<String>>(service: RemoteService, message: S) -> Self {
        Error::Remote {
            service,
            status: None,
            message: message.into(),
        }
    }

    /// Creates a remote error carrying the HTTP status.
    pub fn remote_status<S: Into<String>>(service: RemoteService, status: u16, message: S) -> Self {
        Error::Remote {
            service,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Error::NotFound { what: what.into() }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it concerned.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<std::path::Path>) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Classifies the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Validation { .. } | Error::ImageRejected(_) => ErrorCategory::Validation,
            Error::Remote { .. } | Error::NotFound { .. } => ErrorCategory::Remote,
            Error::Config { .. } | Error::Io { .. } | Error::Serialization(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns `true` for local validation failures.
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Returns `true` when the remote service answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::Remote {
                    status: Some(404),
                    ..
                }
        )
    }
}

impl From<ImageRejection> for Error {
    fn from(rejection: ImageRejection) -> Self {
        Error::ImageRejected(rejection)
    }
}
