//! Common test utilities and harness for the admin integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use svara_admin::{AdminPanel, ClientRepository, SignedImageResolver};
use svara_auth::MemoryAuth;
use svara_core::memory::MemoryBackend;
use svara_core::{ClientId, ClientRecord, ImageUpload};

pub const ADMIN_EMAIL: &str = "admin@example.lt";
pub const ADMIN_PASSWORD: &str = "secret1";

/// In-memory backend and auth provider shared by the pieces under test.
pub struct TestHarness {
    pub backend: Arc<MemoryBackend>,
    pub auth: Arc<MemoryAuth>,
}

impl TestHarness {
    /// Empty table, one admin account, nobody signed in.
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Table preloaded with `rows`.
    pub fn with_rows(rows: Vec<ClientRecord>) -> Self {
        Self {
            backend: Arc::new(MemoryBackend::with_rows(rows)),
            auth: Arc::new(MemoryAuth::new().with_account(ADMIN_EMAIL, ADMIN_PASSWORD)),
        }
    }

    pub fn repository(&self) -> ClientRepository {
        ClientRepository::new(self.backend.clone(), self.backend.clone())
    }

    /// Repository with the list already loaded and the load call forgotten.
    pub async fn loaded_repository(&self) -> ClientRepository {
        let mut repo = self.repository();
        repo.refresh().await.unwrap();
        self.backend.clear_calls();
        repo
    }

    pub fn panel(&self) -> AdminPanel {
        AdminPanel::new(self.repository(), self.auth.clone())
    }

    pub async fn loaded_panel(&self) -> AdminPanel {
        let mut panel = self.panel();
        panel.load().await.unwrap();
        self.backend.clear_calls();
        panel
    }

    pub fn resolver(&self) -> SignedImageResolver {
        SignedImageResolver::new(self.backend.clone())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A stored record; higher ids are newer.
pub fn record(id: i64, name: &str, image_url: Option<&str>) -> ClientRecord {
    ClientRecord {
        id: ClientId::new(id),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
            + chrono::Duration::minutes(id),
        name: name.to_string(),
        email: format!("{}@example.lt", name.to_lowercase()),
        phone: Some("+37060000000".to_string()),
        text: Some("Full detail".to_string()),
        image_url: image_url.map(str::to_string),
    }
}

pub fn jpeg(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])
}
