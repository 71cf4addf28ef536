//! airtable-auth-adapter - Airtable persistence for authentication frameworks
//!
//! This crate maps the four entities an authentication framework persists
//! (users, linked provider accounts, sessions and verification tokens) onto
//! Airtable tables. It is split in three layers:
//!
//! - [`TableStore`]: the raw table client (HTTP against the Airtable REST API,
//!   or an in-memory store for tests and local development)
//! - [`Model`]: one table-bound model per entity, translating between rows and
//!   canonical entities (ISO dates, singleton linked-record lists)
//! - [`Adapter`]: the operation set the authentication framework calls,
//!   implemented by [`AirtableAdapter`]
//!
//! Airtable offers no transactions and filtered reads may lag behind writes.
//! Cascading deletes and token consumption are sequential best-effort
//! operations, and follow-up reads after a write always go by record id.

mod adapter;
mod config;
mod model;
mod store;
mod types;

#[cfg(test)]
mod test_utils;

pub use adapter::{Adapter, AdapterError, AirtableAdapter};
pub use config::{AirtableOptions, ConfigError, DEFAULT_API_URL, TableNames};
pub use model::{
    AccountModel, Model, ModelError, Row, SessionModel, UserModel, VerificationModel,
};
pub use store::{AirtableStore, Fields, Filter, InMemoryTableStore, Record, StoreError, TableStore};
pub use types::{
    Account, NewUser, ProviderAccountId, Session, SessionAndUser, SessionUpdate, User, UserUpdate,
    VerificationToken, VerificationTokenKey,
};
