//! Remote data service traits.
//!
//! The admin core talks to the hosted backend through two seams:
//!
//! - [`ClientTable`]: the `clients` row store (list, insert, update by id)
//! - [`ObjectStore`]: the private photo bucket (upload, remove, sign)
//!
//! Implementations perform exactly one remote round-trip per call, with no
//! retries. `svara-supabase` provides the network implementation and
//! [`crate::memory::MemoryBackend`] an in-process one.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ClientId, ClientPayload, ClientRecord};

/// Default validity of a signed URL: one hour.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Row store holding client records.
#[async_trait]
pub trait ClientTable: Send + Sync {
    /// All rows, newest `created_at` first.
    async fn list_clients(&self) -> Result<Vec<ClientRecord>>;

    /// Inserts a row and returns it with server-assigned id and timestamp.
    async fn insert_client(&self, payload: &ClientPayload) -> Result<ClientRecord>;

    /// Overwrites every column of the row with the given id.
    async fn update_client(&self, id: ClientId, payload: &ClientPayload) -> Result<()>;
}

/// Private object store holding car photos.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key`. Existing objects are never overwritten.
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Removes the given objects.
    async fn remove(&self, keys: &[String]) -> Result<()>;

    /// Exchanges an object key for a time-limited URL.
    async fn create_signed_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl>;
}

/// A capability URL granting temporary read access to one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedUrl {
    /// Object key the URL points at.
    pub key: String,
    /// Absolute URL.
    pub url: String,
    /// Instant after which the URL stops working.
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    /// Creates a signed URL expiring `expires_in` from now.
    pub fn new(key: impl Into<String>, url: impl Into<String>, expires_in: Duration) -> Self {
        let ttl = chrono::Duration::from_std(expires_in).unwrap_or(chrono::Duration::zero());
        Self {
            key: key.into(),
            url: url.into(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// Time left before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns `true` when at least `margin` of validity is left.
    pub fn is_fresh(&self, margin: Duration) -> bool {
        self.remaining() > margin
    }
}
