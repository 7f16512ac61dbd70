//! Session persistence between runs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{AuthError, Session};

/// Keeps the current session across process restarts.
pub trait SessionStore: Send + Sync {
    /// The stored session, if any.
    fn load(&self) -> Result<Option<Session>, AuthError>;

    /// Replaces the stored session.
    fn save(&self, session: &Session) -> Result<(), AuthError>;

    /// Forgets the stored session.
    fn clear(&self) -> Result<(), AuthError>;
}

/// Session kept as a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::Store(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file means "no session", the user signs in again.
                log::warn!("Ignoring unreadable session file {}: {e}", self.path.display());
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuthError::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| AuthError::Store(e.to_string()))?;
        write_private(&self.path, json.as_bytes()).map_err(|e| {
            AuthError::Store(format!("failed to write {}: {e}", self.path.display()))
        })
    }

    fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Store(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Writes `contents` to a file only the owner can read.
///
/// New files are created with mode 0600; an existing file is narrowed to
/// 0600 before anything is written to it.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.flush()
}

/// Session kept in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| AuthError::Store(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}
