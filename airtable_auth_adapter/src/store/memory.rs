use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::errors::StoreError;
use super::filter::Filter;
use super::types::{Fields, InMemoryTableStore, Record, TableStore};

impl InMemoryTableStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory table store");
        Self::default()
    }

    /// All records of a table, in insertion order
    pub async fn snapshot(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn record_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Per-table record counts
    pub async fn table_sizes(&self) -> HashMap<String, usize> {
        self.tables
            .read()
            .await
            .iter()
            .map(|(name, records)| (name.clone(), records.len()))
            .collect()
    }

    /// Remove every record of every table
    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }

    fn gen_record_id() -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("rec{}", &id[..14])
    }
}

// Airtable drops blank values instead of storing them
fn merge_fields(target: &mut Fields, fields: Fields) {
    for (key, value) in fields {
        match value {
            Value::Null => {
                target.remove(&key);
            }
            Value::String(s) if s.is_empty() => {
                target.remove(&key);
            }
            value => {
                target.insert(key, value);
            }
        }
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn find(&self, table: &str, id: &str) -> Result<Record, StoreError> {
        self.tables
            .read()
            .await
            .get(table)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().await;
        let records = match tables.get(table) {
            Some(records) => records
                .iter()
                .filter(|r| filter.is_none_or(|f| f.matches(&r.fields)))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(records)
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, StoreError> {
        let mut stored = Fields::new();
        merge_fields(&mut stored, fields);

        let record = Record {
            id: Self::gen_record_id(),
            created_time: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            fields: stored,
        };

        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let mut tables = self.tables.write().await;
        let record = tables
            .get_mut(table)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        merge_fields(&mut record.fields, fields);
        Ok(record.clone())
    }

    async fn destroy(&self, table: &str, ids: &[String]) -> Result<Vec<String>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tables = self.tables.write().await;
        let records = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::NotFound(ids.join(",")))?;

        // Like the real store, a request naming an unknown id deletes nothing
        let existing: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        if let Some(missing) = ids.iter().find(|id| !existing.contains(id.as_str())) {
            return Err(StoreError::NotFound(missing.clone()));
        }

        let doomed: HashSet<&String> = ids.iter().collect();
        records.retain(|r| !doomed.contains(&r.id));

        Ok(ids.to_vec())
    }
}

impl std::fmt::Debug for InMemoryTableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTableStore").finish_non_exhaustive()
    }
}
