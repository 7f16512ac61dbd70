//! Client records and their photos.
//!
//! [`ClientRepository`] owns the in-memory client list shown by the admin
//! panel and keeps it in step with the row store and the photo bucket. Row
//! and object writes are separate calls with no transaction around them;
//! the order below keeps every stored row pointing at an existing object:
//!
//! - create: upload photo, insert row (photo removed again if the insert fails)
//! - update: upload new photo, update row (new photo removed again if the
//!   update fails), then remove the old photo
//!
//! Removals are best-effort and only logged.

use std::sync::Arc;

use svara_core::config::SvaraConfig;
use svara_core::media::{new_object_key, object_key_from_reference};
use svara_core::{
    ClientFields, ClientId, ClientRecord, ClientTable, Error as CoreError, ImageUpload,
    MediaRules, ObjectStore,
};

use crate::error::Result;

/// Default folder for photos inside the bucket.
pub const DEFAULT_OBJECT_PREFIX: &str = "cars";

/// The admin's view of the `clients` table.
pub struct ClientRepository {
    table: Arc<dyn ClientTable>,
    objects: Arc<dyn ObjectStore>,
    rules: MediaRules,
    object_prefix: String,
    records: Vec<ClientRecord>,
}

impl ClientRepository {
    /// Creates an empty repository with default media rules.
    pub fn new(table: Arc<dyn ClientTable>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            table,
            objects,
            rules: MediaRules::default(),
            object_prefix: DEFAULT_OBJECT_PREFIX.to_string(),
            records: Vec::new(),
        }
    }

    /// Creates a repository using the configured media rules and prefix.
    pub fn from_config(
        table: Arc<dyn ClientTable>,
        objects: Arc<dyn ObjectStore>,
        config: &SvaraConfig,
    ) -> Self {
        Self::new(table, objects)
            .with_rules(config.media.rules())
            .with_object_prefix(config.supabase.object_prefix.clone())
    }

    /// Replaces the media rules.
    pub fn with_rules(mut self, rules: MediaRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replaces the folder photos are uploaded to.
    pub fn with_object_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.object_prefix = prefix.into();
        self
    }

    /// Media rules applied to uploads.
    pub fn rules(&self) -> &MediaRules {
        &self.rules
    }

    /// Current list, newest first.
    pub fn records(&self) -> &[ClientRecord] {
        &self.records
    }

    /// Looks up a record in the current list.
    pub fn get(&self, id: ClientId) -> Option<&ClientRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Reloads the list from the row store.
    ///
    /// On failure the previous list is kept.
    pub async fn refresh(&mut self) -> Result<&[ClientRecord]> {
        let rows = self.table.list_clients().await?;
        tracing::debug!(count = rows.len(), "Client list loaded");
        self.records = rows;
        Ok(&self.records)
    }

    /// Creates a client, uploading its photo first.
    ///
    /// The returned record carries the server-assigned id and timestamp and
    /// is placed at the top of the list.
    pub async fn create(
        &mut self,
        fields: &ClientFields,
        image: Option<&ImageUpload>,
    ) -> Result<&ClientRecord> {
        fields.validate()?;
        if let Some(upload) = image {
            self.rules.check(upload).map_err(CoreError::from)?;
        }

        let uploaded = match image {
            Some(upload) => Some(self.upload_image(upload).await?),
            None => None,
        };

        let payload = fields.to_payload(uploaded.clone())?;
        let record = match self.table.insert_client(&payload).await {
            Ok(record) => record,
            Err(e) => {
                if let Some(key) = uploaded {
                    self.discard_object(&key, "insert failed").await;
                }
                return Err(e.into());
            }
        };

        tracing::info!(id = %record.id, "Client created");
        self.records.insert(0, record);
        Ok(&self.records[0])
    }

    /// Updates a client listed in the repository.
    ///
    /// Without a new image the stored photo reference is kept.
    pub async fn update(
        &mut self,
        id: ClientId,
        fields: &ClientFields,
        image: Option<&ImageUpload>,
    ) -> Result<&ClientRecord> {
        fields.validate()?;
        if let Some(upload) = image {
            self.rules.check(upload).map_err(CoreError::from)?;
        }
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found(format!("client {id}")))?;
        let previous_image = self.records[index].image_url.clone();

        let uploaded = match image {
            Some(upload) => Some(self.upload_image(upload).await?),
            None => None,
        };

        let payload = fields.to_payload(uploaded.clone().or_else(|| previous_image.clone()))?;
        if let Err(e) = self.table.update_client(id, &payload).await {
            if let Some(key) = uploaded {
                self.discard_object(&key, "update failed").await;
            }
            return Err(e.into());
        }

        if uploaded.is_some() {
            if let Some(old) = previous_image.filter(|old| !old.is_empty()) {
                match object_key_from_reference(&old) {
                    Ok(key) => self.discard_object(&key, "replaced").await,
                    Err(e) => {
                        tracing::warn!(reference = %old, error = %e, "Cannot remove old image")
                    }
                }
            }
        }

        tracing::info!(%id, "Client updated");
        let merged = self.records[index].merged(&payload);
        self.records[index] = merged;
        Ok(&self.records[index])
    }

    async fn upload_image(&self, upload: &ImageUpload) -> Result<String> {
        let key = new_object_key(&self.object_prefix, upload);
        self.objects
            .upload(&key, &upload.bytes, &upload.content_type)
            .await?;
        tracing::debug!(key = %key, size = upload.size(), "Image uploaded");
        Ok(key)
    }

    async fn discard_object(&self, key: &str, reason: &str) {
        match self.objects.remove(&[key.to_string()]).await {
            Ok(()) => tracing::debug!(key, reason, "Image removed"),
            Err(e) => tracing::warn!(key, reason, error = %e, "Failed to remove image"),
        }
    }
}

impl std::fmt::Debug for ClientRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRepository")
            .field("records", &self.records.len())
            .field("object_prefix", &self.object_prefix)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
