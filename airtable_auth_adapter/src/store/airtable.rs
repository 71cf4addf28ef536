use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AirtableOptions;

use super::errors::StoreError;
use super::filter::Filter;
use super::types::{AirtableStore, Fields, Record, TableStore};
use super::MAX_BATCH_SIZE;

const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<Record>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeletedRecord {
    id: String,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    records: Vec<DeletedRecord>,
}

#[derive(Debug, Serialize)]
struct FieldsBody<'a> {
    fields: &'a Fields,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

// Airtable reports errors either as `{"error": "NOT_FOUND"}` or as
// `{"error": {"type": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: String,
    },
    Code(String),
}

impl AirtableStore {
    pub fn new(options: &AirtableOptions) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        tracing::info!(
            "Initializing Airtable store: url={}, base={}",
            options.api_url,
            options.base_id
        );

        Ok(Self {
            client,
            api_url: options.api_url.trim_end_matches('/').to_string(),
            base_id: options.base_id.clone(),
            api_key: options.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let url = format!(
            "{}/{}/{}",
            self.api_url,
            urlencoding::encode(&self.base_id),
            urlencoding::encode(table)
        );
        Ok(Url::parse(&url)?)
    }

    fn record_url(&self, table: &str, id: &str) -> Result<Url, StoreError> {
        let url = format!(
            "{}/{}",
            self.table_url(table)?.as_str(),
            urlencoding::encode(id)
        );
        Ok(Url::parse(&url)?)
    }

    async fn read<T: DeserializeOwned>(response: Response, target: &str) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = api_error(status, &body, target);
        tracing::debug!(status = %status, error = %error, "Airtable request failed");
        Err(error)
    }
}

fn api_error(status: StatusCode, body: &str, target: &str) -> StoreError {
    let (kind, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorBody::Detailed { kind, message },
        }) => (kind, message),
        Ok(ErrorEnvelope {
            error: ErrorBody::Code(kind),
        }) => (kind, String::new()),
        // Without an error code only the status can tell a missing record
        Err(_) if status == StatusCode::NOT_FOUND => {
            return StoreError::NotFound(target.to_string());
        }
        Err(_) => (
            status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
            body.to_string(),
        ),
    };

    // Only record-level codes; TABLE_NOT_FOUND and friends stay errors
    if kind == "NOT_FOUND" || kind == "MODEL_ID_NOT_FOUND" {
        return StoreError::NotFound(target.to_string());
    }

    StoreError::Api {
        status: status.as_u16(),
        kind,
        message,
    }
}

#[async_trait]
impl TableStore for AirtableStore {
    #[tracing::instrument(skip(self), fields(table = %table, record_id = %id))]
    async fn find(&self, table: &str, id: &str) -> Result<Record, StoreError> {
        let response = self
            .client
            .get(self.record_url(table, id)?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::read(response, id).await
    }

    #[tracing::instrument(skip(self, filter), fields(table = %table))]
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<Record>, StoreError> {
        let formula = filter.map(Filter::to_formula);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut url = self.table_url(table)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(formula) = &formula {
                    query.append_pair("filterByFormula", formula);
                }
                if let Some(offset) = &offset {
                    query.append_pair("offset", offset);
                }
            }

            tracing::debug!(formula = ?formula, offset = ?offset, "Selecting records");

            let response = self
                .client
                .get(url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            let page: ListResponse = Self::read(response, table).await?;

            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = records.len(), "Selected records");
        Ok(records)
    }

    #[tracing::instrument(skip(self, fields), fields(table = %table))]
    async fn create(&self, table: &str, fields: Fields) -> Result<Record, StoreError> {
        let response = self
            .client
            .post(self.table_url(table)?)
            .bearer_auth(&self.api_key)
            .json(&FieldsBody { fields: &fields })
            .send()
            .await?;

        let record: Record = Self::read(response, table).await?;
        tracing::debug!(record_id = %record.id, "Created record");
        Ok(record)
    }

    #[tracing::instrument(skip(self, fields), fields(table = %table, record_id = %id))]
    async fn update(&self, table: &str, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let response = self
            .client
            .patch(self.record_url(table, id)?)
            .bearer_auth(&self.api_key)
            .json(&FieldsBody { fields: &fields })
            .send()
            .await?;

        Self::read(response, id).await
    }

    #[tracing::instrument(skip(self, ids), fields(table = %table, count = ids.len()))]
    async fn destroy(&self, table: &str, ids: &[String]) -> Result<Vec<String>, StoreError> {
        let mut deleted = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_BATCH_SIZE) {
            let mut url = self.table_url(table)?;
            {
                let mut query = url.query_pairs_mut();
                for id in chunk {
                    query.append_pair("records[]", id);
                }
            }

            let response = self
                .client
                .delete(url)
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            let result: DeleteResponse = Self::read(response, &chunk.join(",")).await?;

            deleted.extend(
                result
                    .records
                    .into_iter()
                    .filter(|r| r.deleted)
                    .map(|r| r.id),
            );
        }

        Ok(deleted)
    }
}
