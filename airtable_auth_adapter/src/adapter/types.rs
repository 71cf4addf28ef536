use async_trait::async_trait;

use crate::types::{
    Account, NewUser, ProviderAccountId, Session, SessionAndUser, SessionUpdate, User, UserUpdate,
    VerificationToken, VerificationTokenKey,
};

use super::errors::AdapterError;

/// Persistence contract of the authentication framework
///
/// Lookups return `Ok(None)` when nothing matches; errors are reserved for
/// broken preconditions and store failures.
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, AdapterError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, AdapterError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AdapterError>;

    async fn get_user_by_account(
        &self,
        key: &ProviderAccountId,
    ) -> Result<Option<User>, AdapterError>;

    async fn update_user(&self, user: UserUpdate) -> Result<Option<User>, AdapterError>;

    /// Delete a user together with its sessions and linked accounts
    async fn delete_user(&self, id: &str) -> Result<(), AdapterError>;

    async fn link_account(&self, account: Account) -> Result<(), AdapterError>;

    /// Fails with [`AdapterError::AccountNotFound`] if nothing is linked for `key`
    async fn unlink_account(&self, key: &ProviderAccountId) -> Result<(), AdapterError>;

    async fn create_session(&self, session: Session) -> Result<Session, AdapterError>;

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionAndUser>, AdapterError>;

    async fn update_session(&self, session: SessionUpdate)
    -> Result<Option<Session>, AdapterError>;

    async fn delete_session(&self, session_token: &str) -> Result<(), AdapterError>;

    async fn create_verification_token(
        &self,
        token: VerificationToken,
    ) -> Result<Option<VerificationToken>, AdapterError>;

    /// Consume a verification token; a token is handed out at most once
    async fn use_verification_token(
        &self,
        key: &VerificationTokenKey,
    ) -> Result<Option<VerificationToken>, AdapterError>;
}
