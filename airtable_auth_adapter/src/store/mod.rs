mod airtable;
mod errors;
mod filter;
mod memory;
mod types;

pub use errors::StoreError;
pub use filter::Filter;
pub use types::{AirtableStore, Fields, InMemoryTableStore, Record, TableStore};

/// Maximum number of records Airtable accepts in one batch request
pub(crate) const MAX_BATCH_SIZE: usize = 10;
