//! The operation set an authentication framework calls to persist its state

mod airtable;
mod errors;
mod types;

pub use airtable::AirtableAdapter;
pub use errors::AdapterError;
pub use types::Adapter;
