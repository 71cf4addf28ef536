use std::sync::Arc;

use crate::store::{Fields, Filter, Record, TableStore};
use crate::types::{Session, SessionUpdate};

use super::errors::ModelError;
use super::fields::{put_string, put_timestamp, required_string, required_timestamp, unwrap_link, wrap_link};
use super::types::{FIELD_EXPIRES, FIELD_USER_ID, Row};
use super::{delete_rows, not_found_as_none};

const FIELD_SESSION_TOKEN: &str = "sessionToken";

/// Operations on the Session table
#[derive(Clone)]
pub struct SessionModel {
    store: Arc<dyn TableStore>,
    table: String,
}

impl SessionModel {
    pub(crate) fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Row<Session>>, ModelError> {
        let record = not_found_as_none(self.store.find(&self.table, id).await)?;
        record.map(session_from_record).transpose()
    }

    /// Get the session row holding `session_token`
    #[tracing::instrument(skip(self, session_token), fields(table = %self.table))]
    pub async fn get_by_token(&self, session_token: &str) -> Result<Option<Row<Session>>, ModelError> {
        let filter = Filter::eq(FIELD_SESSION_TOKEN, session_token);
        let records = self.store.select(&self.table, Some(&filter)).await?;

        tracing::info!(found = !records.is_empty(), "Session lookup completed");
        records.into_iter().next().map(session_from_record).transpose()
    }

    /// Row ids of every session owned by a user
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn ids_by_user(&self, user_id: &str) -> Result<Vec<String>, ModelError> {
        let filter = Filter::eq(FIELD_USER_ID, user_id);
        let records = self.store.select(&self.table, Some(&filter)).await?;
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    #[tracing::instrument(skip(self, session), fields(table = %self.table, user_id = %session.user_id))]
    pub async fn create(&self, session: &Session) -> Result<Row<Session>, ModelError> {
        if session.user_id.is_empty() {
            return Err(ModelError::MissingId(
                "user_id must be set before creating a session".to_string(),
            ));
        }

        let mut fields = Fields::new();
        put_string(&mut fields, FIELD_SESSION_TOKEN, Some(&session.session_token));
        fields.insert(FIELD_USER_ID.to_string(), wrap_link(&session.user_id));
        put_timestamp(&mut fields, FIELD_EXPIRES, Some(&session.expires));

        let record = self.store.create(&self.table, fields).await?;
        tracing::debug!(session_id = %record.id, "Created session");
        session_from_record(record)
    }

    /// Update the row `id` with the fields present in `update`
    ///
    /// Returns `None` when the row no longer exists.
    #[tracing::instrument(skip(self, update), fields(table = %self.table))]
    pub async fn update(
        &self,
        id: &str,
        update: &SessionUpdate,
    ) -> Result<Option<Session>, ModelError> {
        if id.is_empty() {
            return Err(ModelError::MissingId("Cannot update session without id".to_string()));
        }

        let mut fields = Fields::new();
        if let Some(user_id) = update.user_id.as_deref().filter(|u| !u.is_empty()) {
            fields.insert(FIELD_USER_ID.to_string(), wrap_link(user_id));
        }
        put_timestamp(&mut fields, FIELD_EXPIRES, update.expires.as_ref());

        let record = not_found_as_none(self.store.update(&self.table, id, fields).await)?;
        record
            .map(|r| session_from_record(r).map(Row::into_entity))
            .transpose()
    }

    /// Delete one session row; `false` if it was already gone
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(&self, id: &str) -> Result<bool, ModelError> {
        Ok(self.delete_many(&[id.to_string()]).await? == 1)
    }

    pub async fn delete_many(&self, ids: &[String]) -> Result<usize, ModelError> {
        delete_rows(self.store.as_ref(), &self.table, ids).await
    }
}

fn session_from_record(record: Record) -> Result<Row<Session>, ModelError> {
    let fields = &record.fields;
    let session = Session {
        session_token: required_string(fields, FIELD_SESSION_TOKEN)?,
        user_id: unwrap_link(fields.get(FIELD_USER_ID)).unwrap_or_default(),
        expires: required_timestamp(fields, FIELD_EXPIRES)?,
    };
    Ok(Row::new(record.id, session))
}
