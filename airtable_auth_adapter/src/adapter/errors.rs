use thiserror::Error;

use crate::config::ConfigError;
use crate::model::ModelError;
use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Config(ConfigError),

    /// The caller broke an operation's precondition (e.g. a missing id)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Account not found: {provider} {provider_account_id}")]
    AccountNotFound {
        provider: String,
        provider_account_id: String,
    },

    #[error("Model error: {0}")]
    Model(ModelError),
}

impl AdapterError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::Config(err) => tracing::error!("Configuration error: {}", err),
            Self::Precondition(msg) => tracing::error!("Precondition failed: {}", msg),
            Self::AccountNotFound {
                provider,
                provider_account_id,
            } => tracing::error!("Account not found: {} {}", provider, provider_account_id),
            Self::Model(err) => tracing::error!("Model error: {}", err),
        }
        self
    }

    /// Whether the underlying store rejected the request as rate limited
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Model(ModelError::Store(StoreError::Api { status: 429, .. }))
        )
    }
}

// Conversions log on the way up, like every other adapter error

impl From<ModelError> for AdapterError {
    fn from(err: ModelError) -> Self {
        let error = match err {
            ModelError::Config(e) => Self::Config(e),
            ModelError::MissingId(msg) => Self::Precondition(msg),
            other => Self::Model(other),
        };
        tracing::error!("{}", error);
        error
    }
}

impl From<StoreError> for AdapterError {
    fn from(err: StoreError) -> Self {
        Self::from(ModelError::Store(err))
    }
}

impl From<ConfigError> for AdapterError {
    fn from(err: ConfigError) -> Self {
        let error = Self::Config(err);
        tracing::error!("{}", error);
        error
    }
}
