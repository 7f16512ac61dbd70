//! Private photo bucket over the Storage API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use svara_core::{ObjectStore, RemoteService, Result, SignedUrl};

use crate::client::SupabaseClient;
use crate::error::{check, decode, transport};

const SERVICE: RemoteService = RemoteService::Storage;

#[derive(Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl SupabaseClient {
    fn object_url(&self, key: &str) -> String {
        self.url(&format!("/storage/v1/object/{}/{key}", self.inner.bucket))
    }

    /// Signed URLs come back relative to the storage root.
    fn absolute_signed_url(&self, signed: &str) -> String {
        if signed.starts_with("http://") || signed.starts_with("https://") {
            signed.to_string()
        } else {
            self.url(&format!("/storage/v1{signed}"))
        }
    }
}

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        tracing::debug!(bucket = %self.inner.bucket, key, size = bytes.len(), "Uploading object");
        let response = self
            .authorized(Method::POST, &self.object_url(key))
            .await?
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, &self.inner.cache_control)
            .header("x-upsert", "false")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        check(response, SERVICE).await?;
        tracing::info!(key, "Uploaded object");
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        tracing::debug!(bucket = %self.inner.bucket, ?keys, "Removing objects");
        let url = self.url(&format!("/storage/v1/object/{}", self.inner.bucket));
        let response = self
            .authorized(Method::DELETE, &url)
            .await?
            .json(&RemoveRequest { prefixes: keys })
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        check(response, SERVICE).await?;
        Ok(())
    }

    async fn create_signed_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl> {
        let url = self.url(&format!(
            "/storage/v1/object/sign/{}/{key}",
            self.inner.bucket
        ));
        let response = self
            .authorized(Method::POST, &url)
            .await?
            .json(&SignRequest {
                expires_in: expires_in.as_secs(),
            })
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let signed: SignResponse = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| decode(SERVICE, e))?;
        tracing::debug!(key, "Signed object URL");
        Ok(SignedUrl::new(
            key,
            self.absolute_signed_url(&signed.signed_url),
            expires_in,
        ))
    }
}
