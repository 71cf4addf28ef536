//! Helpers shared by unit tests

use async_trait::async_trait;
use serde_json::Value;

use crate::store::{Fields, Filter, Record, StoreError, TableStore};

/// Convert a JSON object literal into record fields
pub(crate) fn fields_of(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {other}"),
    }
}

/// A store whose every call fails with the same error
pub(crate) struct FailingStore {
    error: StoreError,
}

impl FailingStore {
    pub(crate) fn new(error: StoreError) -> Self {
        Self { error }
    }

    pub(crate) fn rate_limited() -> Self {
        Self::new(StoreError::Api {
            status: 429,
            kind: "RATE_LIMIT_REACHED".to_string(),
            message: "Rate limit exceeded".to_string(),
        })
    }
}

#[async_trait]
impl TableStore for FailingStore {
    async fn find(&self, _table: &str, _id: &str) -> Result<Record, StoreError> {
        Err(self.error.clone())
    }

    async fn select(&self, _table: &str, _filter: Option<&Filter>) -> Result<Vec<Record>, StoreError> {
        Err(self.error.clone())
    }

    async fn create(&self, _table: &str, _fields: Fields) -> Result<Record, StoreError> {
        Err(self.error.clone())
    }

    async fn update(&self, _table: &str, _id: &str, _fields: Fields) -> Result<Record, StoreError> {
        Err(self.error.clone())
    }

    async fn destroy(&self, _table: &str, _ids: &[String]) -> Result<Vec<String>, StoreError> {
        Err(self.error.clone())
    }
}
