//! Infrastructure layer: record storage, login accounts, configuration.

pub mod accounts;
pub mod config;
pub mod record_store;

pub use accounts::{Account, AccountStore, InMemoryAccountStore, PostgresAccountStore};
pub use config::{ConfigError, Settings};
pub use record_store::{
    InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError, StoreResult,
};
