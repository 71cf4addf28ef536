use std::sync::Arc;

use serde_json::Value;

use crate::store::{Fields, Filter, Record, TableStore};
use crate::types::{Account, ProviderAccountId};

use super::errors::ModelError;
use super::fields::{optional_integer, optional_string, put_string, unwrap_link, wrap_link};
use super::types::{FIELD_USER_ID, Row};
use super::{delete_rows, not_found_as_none};

const FIELD_TYPE: &str = "type";
const FIELD_PROVIDER: &str = "provider";
const FIELD_PROVIDER_ACCOUNT_ID: &str = "providerAccountId";
const FIELD_REFRESH_TOKEN: &str = "refresh_token";
const FIELD_ACCESS_TOKEN: &str = "access_token";
const FIELD_EXPIRES_AT: &str = "expires_at";
const FIELD_TOKEN_TYPE: &str = "token_type";
const FIELD_SCOPE: &str = "scope";
const FIELD_ID_TOKEN: &str = "id_token";
const FIELD_SESSION_STATE: &str = "session_state";

/// Operations on the Account table
#[derive(Clone)]
pub struct AccountModel {
    store: Arc<dyn TableStore>,
    table: String,
}

impl AccountModel {
    pub(crate) fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Get the account linked for a provider identity
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn get_by_provider(
        &self,
        key: &ProviderAccountId,
    ) -> Result<Option<Row<Account>>, ModelError> {
        let filter = Filter::and([
            Filter::eq(FIELD_PROVIDER_ACCOUNT_ID, key.provider_account_id.as_str()),
            Filter::eq(FIELD_PROVIDER, key.provider.as_str()),
        ]);
        let records = self.store.select(&self.table, Some(&filter)).await?;

        tracing::info!(found = !records.is_empty(), "Account lookup completed");
        records.into_iter().next().map(account_from_record).transpose()
    }

    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Row<Account>>, ModelError> {
        let record = not_found_as_none(self.store.find(&self.table, id).await)?;
        record.map(account_from_record).transpose()
    }

    /// Row ids of every account linked to a user
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn ids_by_user(&self, user_id: &str) -> Result<Vec<String>, ModelError> {
        let filter = Filter::eq(FIELD_USER_ID, user_id);
        let records = self.store.select(&self.table, Some(&filter)).await?;
        Ok(records.into_iter().map(|r| r.id).collect())
    }

    #[tracing::instrument(skip(self, account), fields(table = %self.table, provider = %account.provider))]
    pub async fn create(&self, account: &Account) -> Result<Row<Account>, ModelError> {
        if account.user_id.is_empty() {
            return Err(ModelError::MissingId(
                "user_id must be set before linking an account".to_string(),
            ));
        }

        let mut fields = Fields::new();
        fields.insert(FIELD_USER_ID.to_string(), wrap_link(&account.user_id));
        put_string(&mut fields, FIELD_TYPE, Some(&account.account_type));
        put_string(&mut fields, FIELD_PROVIDER, Some(&account.provider));
        put_string(
            &mut fields,
            FIELD_PROVIDER_ACCOUNT_ID,
            Some(&account.provider_account_id),
        );
        put_string(&mut fields, FIELD_REFRESH_TOKEN, account.refresh_token.as_deref());
        put_string(&mut fields, FIELD_ACCESS_TOKEN, account.access_token.as_deref());
        if let Some(expires_at) = account.expires_at {
            fields.insert(FIELD_EXPIRES_AT.to_string(), Value::from(expires_at));
        }
        put_string(&mut fields, FIELD_TOKEN_TYPE, account.token_type.as_deref());
        put_string(&mut fields, FIELD_SCOPE, account.scope.as_deref());
        put_string(&mut fields, FIELD_ID_TOKEN, account.id_token.as_deref());
        put_string(&mut fields, FIELD_SESSION_STATE, account.session_state.as_deref());

        let record = self.store.create(&self.table, fields).await?;
        tracing::debug!(account_id = %record.id, "Linked account");
        account_from_record(record)
    }

    /// Delete one account row; `false` if it was already gone
    #[tracing::instrument(skip(self), fields(table = %self.table))]
    pub async fn delete(&self, id: &str) -> Result<bool, ModelError> {
        Ok(self.delete_many(&[id.to_string()]).await? == 1)
    }

    /// Delete account rows, tolerating rows that are already gone
    pub async fn delete_many(&self, ids: &[String]) -> Result<usize, ModelError> {
        delete_rows(self.store.as_ref(), &self.table, ids).await
    }
}

fn account_from_record(record: Record) -> Result<Row<Account>, ModelError> {
    let fields = &record.fields;
    let account = Account {
        user_id: unwrap_link(fields.get(FIELD_USER_ID)).unwrap_or_default(),
        account_type: optional_string(fields, FIELD_TYPE).unwrap_or_default(),
        provider: optional_string(fields, FIELD_PROVIDER).unwrap_or_default(),
        provider_account_id: optional_string(fields, FIELD_PROVIDER_ACCOUNT_ID)
            .unwrap_or_default(),
        refresh_token: optional_string(fields, FIELD_REFRESH_TOKEN),
        access_token: optional_string(fields, FIELD_ACCESS_TOKEN),
        expires_at: optional_integer(fields, FIELD_EXPIRES_AT)?,
        token_type: optional_string(fields, FIELD_TOKEN_TYPE),
        scope: optional_string(fields, FIELD_SCOPE),
        id_token: optional_string(fields, FIELD_ID_TOKEN),
        session_state: optional_string(fields, FIELD_SESSION_STATE),
    };
    Ok(Row::new(record.id, account))
}
