//! Per-table models translating between store records and canonical entities

mod account;
mod errors;
mod fields;
mod session;
mod types;
mod user;
mod verification;

use std::sync::Arc;

pub use account::AccountModel;
pub use errors::ModelError;
pub use session::SessionModel;
pub use types::Row;
pub use user::UserModel;
pub use verification::VerificationModel;

use crate::config::{AirtableOptions, TableNames};
use crate::store::{AirtableStore, StoreError, TableStore};

/// The four table models sharing one store
#[derive(Clone)]
pub struct Model {
    pub user: UserModel,
    pub account: AccountModel,
    pub session: SessionModel,
    pub verification: VerificationModel,
}

impl Model {
    pub fn new(store: Arc<dyn TableStore>, tables: &TableNames) -> Self {
        Self {
            user: UserModel::new(store.clone(), tables.user.as_str()),
            account: AccountModel::new(store.clone(), tables.account.as_str()),
            session: SessionModel::new(store.clone(), tables.session.as_str()),
            verification: VerificationModel::new(store, tables.verification_token.as_str()),
        }
    }

    /// Build models backed by the Airtable base described by `options`
    pub fn connect(options: &AirtableOptions) -> Result<Self, ModelError> {
        options.validate()?;
        let store = AirtableStore::new(options)?;
        tracing::info!(base_id = %options.base_id, "Connected Airtable models");
        Ok(Self::new(Arc::new(store), &options.tables))
    }
}

/// Map a store `NotFound` to `None`, keeping every other error
pub(crate) fn not_found_as_none<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete rows by id and return how many were actually removed
///
/// Rows that are already gone are skipped. A batch rejected because one of
/// its ids is missing is retried one id at a time.
pub(crate) async fn delete_rows(
    store: &dyn TableStore,
    table: &str,
    ids: &[String],
) -> Result<usize, ModelError> {
    let ids: Vec<String> = ids.iter().filter(|id| !id.is_empty()).cloned().collect();
    if ids.is_empty() {
        return Ok(0);
    }

    match store.destroy(table, &ids).await {
        Ok(deleted) => Ok(deleted.len()),
        Err(e) if e.is_not_found() && ids.len() == 1 => Ok(0),
        Err(e) if e.is_not_found() => {
            tracing::debug!(table, count = ids.len(), "Batch delete hit a missing row, deleting one by one");
            let mut deleted = 0;
            for id in &ids {
                match store.destroy(table, std::slice::from_ref(id)).await {
                    Ok(removed) => deleted += removed.len(),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(deleted)
        }
        Err(e) => Err(e.into()),
    }
}
