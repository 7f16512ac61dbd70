//! Email/password auth over GoTrue.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use svara_auth::{
    AuthError, AuthEvent, AuthEventKind, AuthProvider, AuthUser, Credentials, Session,
    SignUpOutcome,
};
use tokio::sync::broadcast;

use crate::client::SupabaseClient;
use crate::error::{auth_transport, check_auth};

#[derive(Serialize)]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self, fallback_email: &str) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(self.expires_in),
            user: AuthUser {
                id: self.user.id,
                email: self.user.email.unwrap_or_else(|| fallback_email.to_string()),
            },
        }
    }
}

impl SupabaseClient {
    async fn post_auth<B: Serialize + Sync>(
        &self,
        path_and_query: &str,
        body: &B,
    ) -> Result<serde_json::Value, AuthError> {
        let response = self
            .request(
                Method::POST,
                &self.url(&format!("/auth/v1{path_and_query}")),
                &self.inner.anon_key,
            )
            .json(body)
            .send()
            .await
            .map_err(auth_transport)?;
        check_auth(response)
            .await?
            .json()
            .await
            .map_err(|e| AuthError::remote(format!("unexpected response: {e}")))
    }

    async fn refresh_session(&self, stale: &Session) -> Result<Session, AuthError> {
        tracing::debug!(email = %stale.user.email, "Refreshing session");
        let value = self
            .post_auth(
                "/token?grant_type=refresh_token",
                &RefreshRequest {
                    refresh_token: &stale.refresh_token,
                },
            )
            .await?;
        let tokens: TokenResponse = serde_json::from_value(value)
            .map_err(|e| AuthError::remote(format!("unexpected token response: {e}")))?;
        let session = tokens.into_session(&stale.user.email);
        self.install_session(session.clone(), AuthEventKind::TokenRefreshed);
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError> {
        credentials.validate()?;
        let email = credentials.email.trim();
        tracing::info!(email, "Signing up");
        let value = self
            .post_auth(
                "/signup",
                &PasswordRequest {
                    email,
                    password: &credentials.password,
                },
            )
            .await?;

        if value.get("access_token").is_some() {
            let tokens: TokenResponse = serde_json::from_value(value)
                .map_err(|e| AuthError::remote(format!("unexpected token response: {e}")))?;
            let session = tokens.into_session(email);
            self.install_session(session.clone(), AuthEventKind::SignedIn);
            return Ok(SignUpOutcome::SignedIn(session));
        }

        // Without a session the project requires email confirmation.
        let pending = value
            .get("email")
            .and_then(|v| v.as_str())
            .unwrap_or(email)
            .to_string();
        tracing::info!(email = %pending, "Sign-up awaiting email confirmation");
        Ok(SignUpOutcome::ConfirmationPending { email: pending })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        credentials.validate()?;
        let email = credentials.email.trim();
        let value = self
            .post_auth(
                "/token?grant_type=password",
                &PasswordRequest {
                    email,
                    password: &credentials.password,
                },
            )
            .await?;
        let tokens: TokenResponse = serde_json::from_value(value)
            .map_err(|e| AuthError::remote(format!("unexpected token response: {e}")))?;
        let session = tokens.into_session(email);
        tracing::info!(email = %session.user.email, "Signed in");
        self.install_session(session.clone(), AuthEventKind::SignedIn);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.session_snapshot() {
            let result = self
                .request(
                    Method::POST,
                    &self.url("/auth/v1/logout"),
                    &session.access_token,
                )
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(status = %response.status(), "Remote sign-out failed");
                }
                Err(e) => tracing::warn!(error = %e, "Remote sign-out failed"),
                Ok(_) => {}
            }
        }
        self.drop_session();
        tracing::info!("Signed out");
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = self.session_snapshot() else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }
        match self.refresh_session(&session).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) if e.is_client_error() => {
                tracing::warn!(error = %e, "Refresh token rejected, signing out");
                self.drop_session();
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }
}
