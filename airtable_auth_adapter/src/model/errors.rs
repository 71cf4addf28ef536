use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An operation addressed by row id was called without one
    #[error("Missing id: {0}")]
    MissingId(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<chrono::ParseError> for ModelError {
    fn from(err: chrono::ParseError) -> Self {
        Self::InvalidData(err.to_string())
    }
}
