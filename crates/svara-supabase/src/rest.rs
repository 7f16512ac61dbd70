//! `clients` table over PostgREST.

use async_trait::async_trait;
use reqwest::Method;
use svara_core::{
    ClientId, ClientPayload, ClientRecord, ClientTable, Error, RemoteService, Result,
};

use crate::client::SupabaseClient;
use crate::error::{check, decode, transport};

const SERVICE: RemoteService = RemoteService::Table;

impl SupabaseClient {
    fn table_url(&self) -> String {
        self.url(&format!("/rest/v1/{}", self.inner.table))
    }
}

#[async_trait]
impl ClientTable for SupabaseClient {
    async fn list_clients(&self) -> Result<Vec<ClientRecord>> {
        tracing::debug!(table = %self.inner.table, "Listing clients");
        let response = self
            .authorized(Method::GET, &self.table_url())
            .await?
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let rows: Vec<ClientRecord> = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| decode(SERVICE, e))?;
        tracing::debug!(count = rows.len(), "Listed clients");
        Ok(rows)
    }

    async fn insert_client(&self, payload: &ClientPayload) -> Result<ClientRecord> {
        tracing::debug!(table = %self.inner.table, "Inserting client");
        let response = self
            .authorized(Method::POST, &self.table_url())
            .await?
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let rows: Vec<ClientRecord> = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| decode(SERVICE, e))?;
        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::remote(SERVICE, "insert returned no row"))?;
        tracing::info!(id = %record.id, "Inserted client");
        Ok(record)
    }

    async fn update_client(&self, id: ClientId, payload: &ClientPayload) -> Result<()> {
        tracing::debug!(table = %self.inner.table, %id, "Updating client");
        let response = self
            .authorized(Method::PATCH, &self.table_url())
            .await?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(payload)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        check(response, SERVICE).await?;
        tracing::info!(%id, "Updated client");
        Ok(())
    }
}
