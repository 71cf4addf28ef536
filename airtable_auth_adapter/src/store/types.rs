use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::errors::StoreError;
use super::filter::Filter;

/// Opaque field mapping of one row, as exchanged with the store
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A row as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned record id (`rec...`)
    pub id: String,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,
    /// Airtable omits empty fields, so a missing key means "blank"
    #[serde(default)]
    pub fields: Fields,
}

/// Client for the Airtable REST API
pub struct AirtableStore {
    pub(super) client: reqwest::Client,
    pub(super) api_url: String,
    pub(super) base_id: String,
    pub(super) api_key: String,
}

/// Process-local table store with Airtable-like semantics
#[derive(Clone, Default)]
pub struct InMemoryTableStore {
    pub(super) tables: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

// Trait
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    /// Fetch one record by id. Fails with [`StoreError::NotFound`] if it does not exist.
    async fn find(&self, table: &str, id: &str) -> Result<Record, StoreError>;

    /// Fetch every record matching the filter (all pages), in store order.
    async fn select(&self, table: &str, filter: Option<&Filter>)
    -> Result<Vec<Record>, StoreError>;

    /// Create a record and return it with its assigned id.
    async fn create(&self, table: &str, fields: Fields) -> Result<Record, StoreError>;

    /// Patch the given fields of a record; `null` clears a field.
    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record, StoreError>;

    /// Delete records by id and return the deleted ids.
    async fn destroy(&self, table: &str, ids: &[String]) -> Result<Vec<String>, StoreError>;
}
