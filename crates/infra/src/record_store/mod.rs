//! Catalog persistence boundary.
//!
//! The `RecordStore` trait is what the API layers talk to; the in-memory
//! implementation backs tests/dev and the Postgres one backs deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use r#trait::{RecordStore, StoreError, StoreResult};
