use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AirtableOptions, TableNames};
use crate::model::Model;
use crate::store::{InMemoryTableStore, TableStore};
use crate::types::{
    Account, NewUser, ProviderAccountId, Session, SessionAndUser, SessionUpdate, User, UserUpdate,
    VerificationToken, VerificationTokenKey,
};

use super::errors::AdapterError;
use super::types::Adapter;

/// [`Adapter`] backed by four Airtable tables
#[derive(Clone)]
pub struct AirtableAdapter {
    model: Model,
}

impl AirtableAdapter {
    /// Connect to the base described by `options`
    ///
    /// Fails if the API key or the base id is missing.
    pub fn new(options: AirtableOptions) -> Result<Self, AdapterError> {
        let model = Model::connect(&options)?;
        Ok(Self { model })
    }

    pub fn from_env() -> Result<Self, AdapterError> {
        Self::new(AirtableOptions::from_env()?)
    }

    /// Use an already constructed store, e.g. [`InMemoryTableStore`]
    pub fn with_store(store: Arc<dyn TableStore>, tables: TableNames) -> Self {
        Self {
            model: Model::new(store, &tables),
        }
    }

    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryTableStore::new()), TableNames::default())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

#[async_trait]
impl Adapter for AirtableAdapter {
    async fn create_user(&self, user: NewUser) -> Result<User, AdapterError> {
        Ok(self.model.user.create(&user).await?)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AdapterError> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self.model.user.get_by_id(id).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AdapterError> {
        Ok(self.model.user.get_by_email(email).await?)
    }

    async fn get_user_by_account(
        &self,
        key: &ProviderAccountId,
    ) -> Result<Option<User>, AdapterError> {
        let Some(account) = self.model.account.get_by_provider(key).await? else {
            return Ok(None);
        };
        self.get_user(&account.entity.user_id).await
    }

    async fn update_user(&self, user: UserUpdate) -> Result<Option<User>, AdapterError> {
        if user.id.is_empty() {
            return Err(AdapterError::Precondition(
                "Cannot update user. User id does not exist in user table".to_string(),
            )
            .log());
        }
        Ok(self.model.user.update(&user).await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, id: &str) -> Result<(), AdapterError> {
        if id.is_empty() {
            return Err(AdapterError::Precondition("Cannot delete user without id".to_string()).log());
        }

        // No referential integrity in the store: children go first
        let session_ids = self.model.session.ids_by_user(id).await?;
        let account_ids = self.model.account.ids_by_user(id).await?;

        let sessions = self.model.session.delete_many(&session_ids).await?;
        let accounts = self.model.account.delete_many(&account_ids).await?;
        let deleted = self.model.user.delete(id).await?;

        tracing::info!(sessions, accounts, user_deleted = deleted, "Deleted user");
        Ok(())
    }

    async fn link_account(&self, account: Account) -> Result<(), AdapterError> {
        if account.user_id.is_empty() {
            return Err(
                AdapterError::Precondition("Cannot link account without user id".to_string())
                    .log(),
            );
        }
        self.model.account.create(&account).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn unlink_account(&self, key: &ProviderAccountId) -> Result<(), AdapterError> {
        let Some(account) = self.model.account.get_by_provider(key).await? else {
            return Err(AdapterError::AccountNotFound {
                provider: key.provider.clone(),
                provider_account_id: key.provider_account_id.clone(),
            }
            .log());
        };

        self.model.account.delete(&account.id).await?;
        Ok(())
    }

    async fn create_session(&self, session: Session) -> Result<Session, AdapterError> {
        Ok(self.model.session.create(&session).await?.into_entity())
    }

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionAndUser>, AdapterError> {
        let Some(row) = self.model.session.get_by_token(session_token).await? else {
            return Ok(None);
        };
        let session = row.into_entity();

        match self.get_user(&session.user_id).await? {
            Some(user) => Ok(Some(SessionAndUser { session, user })),
            None => {
                tracing::warn!(user_id = %session.user_id, "Session refers to a user that no longer exists");
                Ok(None)
            }
        }
    }

    async fn update_session(
        &self,
        session: SessionUpdate,
    ) -> Result<Option<Session>, AdapterError> {
        if session.session_token.is_empty() {
            return Err(
                AdapterError::Precondition("Cannot update session without token".to_string())
                    .log(),
            );
        }

        let Some(row) = self.model.session.get_by_token(&session.session_token).await? else {
            return Ok(None);
        };
        Ok(self.model.session.update(&row.id, &session).await?)
    }

    async fn delete_session(&self, session_token: &str) -> Result<(), AdapterError> {
        if let Some(row) = self.model.session.get_by_token(session_token).await? {
            self.model.session.delete(&row.id).await?;
        }
        Ok(())
    }

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<Option<VerificationToken>, AdapterError> {
        let row = self.model.verification.create(&token).await?;
        Ok(Some(row.into_entity()))
    }

    #[tracing::instrument(skip(self, key), fields(identifier = %key.identifier))]
    async fn use_verification_token(
        &self,
        key: &VerificationTokenKey,
    ) -> Result<Option<VerificationToken>, AdapterError> {
        let verification = &self.model.verification;

        let Some(found) = verification.get_by_identifier_and_token(key).await? else {
            return Ok(None);
        };

        // Filtered reads can lag, so confirm the row by id before consuming it
        let Some(current) = verification.get_by_id(&found.id).await? else {
            tracing::debug!(token_id = %found.id, "Verification token vanished before use");
            return Ok(None);
        };

        if !verification.delete(&current.id).await? {
            tracing::debug!(token_id = %current.id, "Verification token already consumed");
            return Ok(None);
        }

        Ok(Some(current.into_entity()))
    }
}
