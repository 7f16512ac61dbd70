//! In-process backend.
//!
//! [`MemoryBackend`] implements both [`ClientTable`] and [`ObjectStore`]
//! against plain collections. It records every call and can be told to fail
//! individual operations, which makes it the workhorse for exercising the
//! admin flow without a network.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backend::{ClientTable, ObjectStore, SignedUrl};
use crate::error::{Error, RemoteService, Result};
use crate::model::{ClientId, ClientPayload, ClientRecord};

/// Remote operation, used for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `ClientTable::list_clients`
    List,
    /// `ClientTable::insert_client`
    Insert,
    /// `ClientTable::update_client`
    Update,
    /// `ObjectStore::upload`
    Upload,
    /// `ObjectStore::remove`
    Remove,
    /// `ObjectStore::create_signed_url`
    Sign,
}

impl Operation {
    fn service(self) -> RemoteService {
        match self {
            Self::List | Self::Insert | Self::Update => RemoteService::Table,
            Self::Upload | Self::Remove | Self::Sign => RemoteService::Storage,
        }
    }
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Rows listed.
    List,
    /// Row inserted with this payload.
    Insert(ClientPayload),
    /// Row updated.
    Update(ClientId, ClientPayload),
    /// Object uploaded under this key.
    Upload(String),
    /// Objects removed.
    Remove(Vec<String>),
    /// URL signed for this key.
    Sign(String),
}

impl Call {
    /// The operation this call belongs to.
    pub fn operation(&self) -> Operation {
        match self {
            Self::List => Operation::List,
            Self::Insert(_) => Operation::Insert,
            Self::Update(..) => Operation::Update,
            Self::Upload(_) => Operation::Upload,
            Self::Remove(_) => Operation::Remove,
            Self::Sign(_) => Operation::Sign,
        }
    }
}

/// An object held by the in-memory bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object content.
    pub bytes: Vec<u8>,
    /// MIME type given at upload.
    pub content_type: String,
}

#[derive(Default)]
struct State {
    rows: Vec<ClientRecord>,
    next_id: i64,
    last_created: Option<DateTime<Utc>>,
    objects: BTreeMap<String, StoredObject>,
    failing: HashSet<Operation>,
    calls: Vec<Call>,
}

/// Table and bucket kept in memory.
pub struct MemoryBackend {
    state: Mutex<State>,
    base_url: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..Default::default()
            }),
            base_url: "memory://cars".to_string(),
        }
    }

    /// Creates a backend preloaded with rows.
    pub fn with_rows(rows: Vec<ClientRecord>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state();
            state.next_id = rows.iter().map(|r| r.id.get()).max().unwrap_or(0) + 1;
            state.last_created = rows.iter().map(|r| r.created_at).max();
            state.rows = rows;
        }
        backend
    }

    /// Stores an object directly, without recording a call.
    pub fn put_object(&self, key: impl Into<String>, bytes: Vec<u8>, content_type: &str) {
        self.state().objects.insert(
            key.into(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Makes every subsequent call of `op` fail.
    pub fn fail(&self, op: Operation) {
        self.state().failing.insert(op);
    }

    /// Lets `op` succeed again.
    pub fn recover(&self, op: Operation) {
        self.state().failing.remove(&op);
    }

    /// All calls made so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls made to `op`.
    pub fn call_count(&self, op: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .count()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Current table content, in insertion order.
    pub fn rows(&self) -> Vec<ClientRecord> {
        self.state().rows.clone()
    }

    /// Keys of all stored objects, sorted.
    pub fn object_keys(&self) -> Vec<String> {
        self.state().objects.keys().cloned().collect()
    }

    /// Returns `true` when an object exists under `key`.
    pub fn has_object(&self, key: &str) -> bool {
        self.state().objects.contains_key(key)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: Call) -> Result<MutexGuard<'_, State>> {
        let op = call.operation();
        let mut state = self.state();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(Error::remote_status(
                op.service(),
                503,
                format!("injected {op:?} failure"),
            ));
        }
        Ok(state)
    }
}

impl State {
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created {
            Some(last) if last >= now => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(stamp);
        stamp
    }
}

#[async_trait]
impl ClientTable for MemoryBackend {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>> {
        let state = self.record(Call::List)?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_client(&self, payload: &ClientPayload) -> Result<ClientRecord> {
        let mut state = self.record(Call::Insert(payload.clone()))?;
        let id = ClientId::new(state.next_id);
        state.next_id += 1;
        let created_at = state.next_created_at();
        let record = ClientRecord {
            id,
            created_at,
            name: payload.name.clone(),
            email: payload.email.clone(),
            phone: payload.phone.clone(),
            text: payload.text.clone(),
            image_url: payload.image_url.clone(),
        };
        state.rows.push(record.clone());
        Ok(record)
    }

    async fn update_client(&self, id: ClientId, payload: &ClientPayload) -> Result<()> {
        let mut state = self.record(Call::Update(id, payload.clone()))?;
        // A filter that matches nothing is not an error for the row store.
        if let Some(row) = state.rows.iter_mut().find(|r| r.id == id) {
            *row = row.merged(payload);
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let mut state = self.record(Call::Upload(key.to_string()))?;
        if state.objects.contains_key(key) {
            return Err(Error::remote_status(
                RemoteService::Storage,
                409,
                "The resource already exists",
            ));
        }
        state.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let mut state = self.record(Call::Remove(keys.to_vec()))?;
        for key in keys {
            state.objects.remove(key);
        }
        Ok(())
    }

    async fn create_signed_url(&self, key: &str, expires_in: Duration) -> Result<SignedUrl> {
        let state = self.record(Call::Sign(key.to_string()))?;
        if !state.objects.contains_key(key) {
            return Err(Error::remote_status(
                RemoteService::Storage,
                404,
                "Object not found",
            ));
        }
        let token = uuid::Uuid::new_v4().simple();
        Ok(SignedUrl::new(
            key,
            format!("{}/{key}?token={token}", self.base_url),
            expires_in,
        ))
    }
}
