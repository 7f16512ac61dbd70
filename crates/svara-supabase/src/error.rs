//! Mapping of HTTP failures onto core and auth errors.

use reqwest::Response;
use serde::Deserialize;
use svara_auth::AuthError;
use svara_core::{Error, RemoteService};

/// Error body shapes returned by PostgREST, Storage and GoTrue.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<serde_json::Value>,
}

impl ApiErrorBody {
    fn text(self) -> Option<String> {
        self.error_description
            .or(self.message)
            .or(self.msg)
            .or(self.error)
    }
}

/// A non-success response, reduced to status and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpFailure {
    pub(crate) status: u16,
    pub(crate) message: String,
}

impl HttpFailure {
    /// Reads the body of a failed response.
    pub(crate) async fn from_response(response: Response) -> Self {
        let http_status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::parse(http_status.as_u16(), &body, http_status.canonical_reason())
    }

    fn parse(http_status: u16, body: &str, reason: Option<&str>) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        // Storage reports some errors as 400 with the real status in the body.
        let status = match &parsed.status_code {
            Some(serde_json::Value::String(s)) => s.parse().ok(),
            Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
        .unwrap_or(http_status);
        let message = parsed
            .text()
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| reason.unwrap_or("request failed").to_string());
        Self { status, message }
    }

    pub(crate) fn into_core(self, service: RemoteService) -> Error {
        Error::remote_status(service, self.status, self.message)
    }

    pub(crate) fn into_auth(self) -> AuthError {
        match self.status {
            400 | 401 | 403 | 422 => AuthError::Rejected(self.message),
            status => AuthError::Remote {
                status: Some(status),
                message: self.message,
            },
        }
    }
}

/// Returns the response when successful, the mapped error otherwise.
pub(crate) async fn check(response: Response, service: RemoteService) -> Result<Response, Error> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(HttpFailure::from_response(response).await.into_core(service))
    }
}

/// Same as [`check`], for auth endpoints.
pub(crate) async fn check_auth(response: Response) -> Result<Response, AuthError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(HttpFailure::from_response(response).await.into_auth())
    }
}

pub(crate) fn transport(service: RemoteService, e: reqwest::Error) -> Error {
    Error::remote(service, format!("request failed: {e}"))
}

pub(crate) fn decode(service: RemoteService, e: reqwest::Error) -> Error {
    Error::remote(service, format!("unexpected response: {e}"))
}

pub(crate) fn auth_transport(e: reqwest::Error) -> AuthError {
    AuthError::remote(format!("request failed: {e}"))
}
