//! Shared HTTP client and session state.

use std::fmt;
use std::sync::{Arc, RwLock};

use reqwest::{Method, RequestBuilder};
use svara_auth::{AuthError, AuthEventKind, AuthEvents, AuthProvider, Session, SessionStore};
use svara_core::{Error, RemoteService, Result, SvaraConfig};

/// Client for one Supabase project.
///
/// Cheap to clone; clones share the connection pool, the current session
/// and the auth event stream.
#[derive(Clone)]
pub struct SupabaseClient {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
    pub(crate) table: String,
    pub(crate) bucket: String,
    pub(crate) cache_control: String,
    pub(crate) session: RwLock<Option<Session>>,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) events: AuthEvents,
}

impl fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url)
            .field("table", &self.inner.table)
            .field("bucket", &self.inner.bucket)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Creates a client for the project described by `config`.
    ///
    /// The session persisted in `store`, if any, becomes the current session.
    pub fn new(config: &SvaraConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        let session = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Could not load stored session");
                None
            }
        };
        if let Some(s) = &session {
            tracing::debug!(email = %s.user.email, "Restored session");
        }

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.supabase.url.trim_end_matches('/').to_string(),
                anon_key: config.supabase.anon_key.clone(),
                table: config.supabase.table.clone(),
                bucket: config.supabase.bucket.clone(),
                cache_control: format!("max-age={}", config.media.upload_cache_control_secs),
                session: RwLock::new(session),
                store,
                events: AuthEvents::new(),
            }),
        })
    }

    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// A request carrying the project key and the given bearer token.
    pub(crate) fn request(&self, method: Method, url: &str, bearer: &str) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(bearer)
    }

    /// A request authorized as the current user, or anonymously when signed out.
    ///
    /// A stored session that cannot be renewed fails the call instead of
    /// falling back to the anon key.
    pub(crate) async fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        let bearer = match self.current_session().await {
            Ok(Some(session)) => session.access_token,
            Ok(None) => self.inner.anon_key.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Session could not be renewed");
                return Err(session_failure(e));
            }
        };
        Ok(self.request(method, url, &bearer))
    }

    pub(crate) fn session_snapshot(&self) -> Option<Session> {
        self.inner
            .session
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Makes `session` current, persists it and publishes `kind`.
    pub(crate) fn install_session(&self, session: Session, kind: AuthEventKind) {
        self.replace_session(Some(session.clone()));
        if let Err(e) = self.inner.store.save(&session) {
            tracing::warn!(error = %e, "Could not persist session");
        }
        self.inner.events.emit(kind, Some(session));
    }

    /// Forgets the current session locally and publishes a sign-out.
    pub(crate) fn drop_session(&self) {
        self.replace_session(None);
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "Could not clear stored session");
        }
        self.inner.events.emit(AuthEventKind::SignedOut, None);
    }

    fn replace_session(&self, session: Option<Session>) {
        match self.inner.session.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

fn session_failure(e: AuthError) -> Error {
    match e {
        AuthError::Remote {
            status: Some(status),
            message,
        } => Error::remote_status(RemoteService::Auth, status, message),
        other => Error::remote(RemoteService::Auth, other.to_string()),
    }
}
