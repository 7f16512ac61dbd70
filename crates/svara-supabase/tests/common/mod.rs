//! Shared helpers for the HTTP contract tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use svara_auth::{AuthUser, MemorySessionStore, Session, SessionStore};
use svara_core::SvaraConfig;
use svara_core::config::SupabaseSettings;
use svara_supabase::SupabaseClient;
use wiremock::MockServer;

pub const ANON_KEY: &str = "anon-key";

pub fn config(server: &MockServer) -> SvaraConfig {
    SvaraConfig {
        supabase: SupabaseSettings {
            url: server.uri(),
            anon_key: ANON_KEY.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn anonymous(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(&config(server), Arc::new(MemorySessionStore::new())).unwrap()
}

pub fn with_store(server: &MockServer, store: Arc<dyn SessionStore>) -> SupabaseClient {
    SupabaseClient::new(&config(server), store).unwrap()
}

pub fn session(access_token: &str, expires_in_secs: i64) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: "refresh-1".to_string(),
        expires_at: Utc::now() + chrono::Duration::seconds(expires_in_secs),
        user: AuthUser {
            id: "user-1".to_string(),
            email: "admin@example.lt".to_string(),
        },
    }
}

pub fn signed_in(server: &MockServer, access_token: &str) -> SupabaseClient {
    with_store(
        server,
        Arc::new(MemorySessionStore::with_session(session(access_token, 3600))),
    )
}

pub fn row(id: i64, name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "created_at": created_at,
        "name": name,
        "email": format!("{}@example.lt", name.to_lowercase()),
        "phone": null,
        "text": null,
        "image_url": null,
    })
}

pub fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-2",
        "user": { "id": "user-1", "email": "admin@example.lt" },
    })
}
