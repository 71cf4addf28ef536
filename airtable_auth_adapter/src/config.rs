//! Central configuration for the airtable-auth-adapter crate

use std::fmt;
use std::time::Duration;
use std::{env, sync::LazyLock};

use thiserror::Error;

/// Base URL of the Airtable REST API
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// User table name
pub(crate) static AIRTABLE_TABLE_USER: LazyLock<String> =
    LazyLock::new(|| env::var("AIRTABLE_TABLE_USER").unwrap_or_else(|_| "User".to_string()));

/// Account table name
pub(crate) static AIRTABLE_TABLE_ACCOUNT: LazyLock<String> =
    LazyLock::new(|| env::var("AIRTABLE_TABLE_ACCOUNT").unwrap_or_else(|_| "Account".to_string()));

/// Session table name
pub(crate) static AIRTABLE_TABLE_SESSION: LazyLock<String> =
    LazyLock::new(|| env::var("AIRTABLE_TABLE_SESSION").unwrap_or_else(|_| "Session".to_string()));

/// Verification token table name
pub(crate) static AIRTABLE_TABLE_VERIFICATION_TOKEN: LazyLock<String> = LazyLock::new(|| {
    env::var("AIRTABLE_TABLE_VERIFICATION_TOKEN")
        .unwrap_or_else(|_| "VerificationToken".to_string())
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing apiKey or baseId: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
}

/// Names of the four tables in the Airtable base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub user: String,
    pub account: String,
    pub session: String,
    pub verification_token: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            user: AIRTABLE_TABLE_USER.clone(),
            account: AIRTABLE_TABLE_ACCOUNT.clone(),
            session: AIRTABLE_TABLE_SESSION.clone(),
            verification_token: AIRTABLE_TABLE_VERIFICATION_TOKEN.clone(),
        }
    }
}

/// Connection settings for an Airtable base
///
/// Both the API key and the base id are required; [`AirtableOptions::validate`]
/// runs when an adapter or model is constructed from these options.
#[derive(Clone)]
pub struct AirtableOptions {
    /// Personal access token or API key
    pub api_key: String,
    /// Base id, e.g. `appXXXXXXXXXXXXXX` from `https://airtable.com/appXXXXXXXXXXXXXX/...`
    pub base_id: String,
    pub api_url: String,
    pub tables: TableNames,
    /// Per-request timeout of the HTTP client
    pub timeout: Duration,
}

impl AirtableOptions {
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            api_url: DEFAULT_API_URL.to_string(),
            tables: TableNames::default(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Read options from `AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID` and the optional
    /// `AIRTABLE_API_URL` / `AIRTABLE_REQUEST_TIMEOUT_SECS` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("AIRTABLE_API_KEY").unwrap_or_default();
        let base_id = env::var("AIRTABLE_BASE_ID").unwrap_or_default();

        let mut options = Self::new(api_key, base_id);

        if let Ok(api_url) = env::var("AIRTABLE_API_URL") {
            options.api_url = api_url;
        }

        if let Ok(timeout) = env::var("AIRTABLE_REQUEST_TIMEOUT_SECS") {
            let secs = timeout
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "AIRTABLE_REQUEST_TIMEOUT_SECS",
                    message: e.to_string(),
                })?;
            options.timeout = Duration::from_secs(secs);
        }

        options.validate()?;
        Ok(options)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("apiKey"));
        }
        if self.base_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("baseId"));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "api_url",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

// Keeps the API key out of logs
impl fmt::Debug for AirtableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableOptions")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .field("api_url", &self.api_url)
            .field("tables", &self.tables)
            .field("timeout", &self.timeout)
            .finish()
    }
}
