use std::sync::Arc;

use crate::store::{Fields, Filter, Record, TableStore};
use crate::types::{VerificationToken, VerificationTokenKey};

use super::errors::ModelError;
use super::fields::{put_string, put_timestamp, required_string, required_timestamp};
use super::types::{FIELD_EXPIRES, Row};
use super::{delete_rows, not_found_as_none};

const FIELD_IDENTIFIER: &str = "identifier";
const FIELD_TOKEN: &str = "token";

/// Operations on the VerificationToken table
#[derive(Clone)]
pub struct VerificationModel {
    store: Arc<dyn TableStore>,
    table: String,
}

impl VerificationModel {
    pub(crate) fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Get the token row matching both identifier and token
    #[tracing::instrument(skip(self, key), fields(table = %self.table, identifier = %key.identifier))]
    pub async fn get_by_identifier_and_token(
        &self,
        key: &VerificationTokenKey,
    ) -> Result<Option<Row<VerificationToken>>, ModelError> {
        let filter = Filter::and([
            Filter::eq(FIELD_IDENTIFIER, key.identifier.as_str()),
            Filter::eq(FIELD_TOKEN, key.token.as_str()),
        ]);
        let records = self.store.select(&self.table, Some(&filter)).await?;

        tracing::info!(found = !records.is_empty(), "Verification token lookup completed");
        records.into_iter().next().map(token_from_record).transpose()
    }

    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Row<VerificationToken>>, ModelError> {
        let record = not_found_as_none(self.store.find(&self.table, id).await)?;
        record.map(token_from_record).transpose()
    }

    #[tracing::instrument(skip(self, token), fields(table = %self.table, identifier = %token.identifier))]
    pub async fn create(&self, token: &VerificationToken) -> Result<Row<VerificationToken>, ModelError> {
        let mut fields = Fields::new();
        put_string(&mut fields, FIELD_IDENTIFIER, Some(&token.identifier));
        put_string(&mut fields, FIELD_TOKEN, Some(&token.token));
        put_timestamp(&mut fields, FIELD_EXPIRES, Some(&token.expires));

        let record = self.store.create(&self.table, fields).await?;
        token_from_record(record)
    }

    /// Delete a token row; `false` if it was already gone
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(&self, id: &str) -> Result<bool, ModelError> {
        Ok(delete_rows(self.store.as_ref(), &self.table, &[id.to_string()]).await? == 1)
    }
}

fn token_from_record(record: Record) -> Result<Row<VerificationToken>, ModelError> {
    let fields = &record.fields;
    let token = VerificationToken {
        identifier: required_string(fields, FIELD_IDENTIFIER)?,
        token: required_string(fields, FIELD_TOKEN)?,
        expires: required_timestamp(fields, FIELD_EXPIRES)?,
    };
    Ok(Row::new(record.id, token))
}
