use std::sync::Arc;

use crate::store::{Fields, Filter, Record, TableStore};
use crate::types::{NewUser, User, UserUpdate};

use super::errors::ModelError;
use super::fields::{optional_string, parse_timestamp, put_string, put_timestamp};
use super::{delete_rows, not_found_as_none};

const FIELD_NAME: &str = "name";
const FIELD_EMAIL: &str = "email";
const FIELD_IMAGE: &str = "image";
const FIELD_EMAIL_VERIFIED: &str = "emailVerified";

/// Operations on the User table
#[derive(Clone)]
pub struct UserModel {
    store: Arc<dyn TableStore>,
    table: String,
}

impl UserModel {
    pub(crate) fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Get a user by record id
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, ModelError> {
        let record = not_found_as_none(self.store.find(&self.table, id).await)?;

        tracing::info!(found = record.is_some(), "User lookup completed");
        record.map(user_from_record).transpose()
    }

    /// Get the first user whose email matches exactly
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, ModelError> {
        // `{email}=''` would match users without an email
        if email.is_empty() {
            return Ok(None);
        }

        let filter = Filter::eq(FIELD_EMAIL, email);
        let records = self.store.select(&self.table, Some(&filter)).await?;

        tracing::info!(found = !records.is_empty(), "User lookup by email completed");
        records.into_iter().next().map(user_from_record).transpose()
    }

    #[tracing::instrument(skip(self, user), fields(table = %self.table))]
    pub async fn create(&self, user: &NewUser) -> Result<User, ModelError> {
        let mut fields = Fields::new();
        put_string(&mut fields, FIELD_NAME, user.name.as_deref());
        put_string(&mut fields, FIELD_EMAIL, Some(&user.email));
        put_string(&mut fields, FIELD_IMAGE, user.image.as_deref());
        put_timestamp(&mut fields, FIELD_EMAIL_VERIFIED, user.email_verified.as_ref());

        let record = self.store.create(&self.table, fields).await?;
        tracing::debug!(user_id = %record.id, "Created user");
        user_from_record(record)
    }

    /// Apply a partial update; `None` if the user row no longer exists
    #[tracing::instrument(skip(self, update), fields(table = %self.table, user_id = %update.id))]
    pub async fn update(&self, update: &UserUpdate) -> Result<Option<User>, ModelError> {
        if update.id.is_empty() {
            return Err(ModelError::MissingId(
                "Cannot update user. User id does not exist in user table".to_string(),
            ));
        }

        let mut fields = Fields::new();
        put_string(&mut fields, FIELD_NAME, update.name.as_deref());
        put_string(&mut fields, FIELD_EMAIL, update.email.as_deref());
        put_string(&mut fields, FIELD_IMAGE, update.image.as_deref());
        put_timestamp(&mut fields, FIELD_EMAIL_VERIFIED, update.email_verified.as_ref());

        let record = not_found_as_none(self.store.update(&self.table, &update.id, fields).await)?;
        record.map(user_from_record).transpose()
    }

    /// Delete a user row; `false` if it was already gone
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(&self, id: &str) -> Result<bool, ModelError> {
        if id.is_empty() {
            return Err(ModelError::MissingId("Cannot delete user without id".to_string()));
        }
        Ok(delete_rows(self.store.as_ref(), &self.table, &[id.to_string()]).await? == 1)
    }
}

// Reverse-link columns (Account, Session) and other extra columns are ignored
fn user_from_record(record: Record) -> Result<User, ModelError> {
    let fields = &record.fields;
    Ok(User {
        name: optional_string(fields, FIELD_NAME),
        email: optional_string(fields, FIELD_EMAIL).unwrap_or_default(),
        image: optional_string(fields, FIELD_IMAGE),
        email_verified: parse_timestamp(fields.get(FIELD_EMAIL_VERIFIED))?,
        id: record.id,
    })
}
