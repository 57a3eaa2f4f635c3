//! Error types for voltage-datastore

use thiserror::Error;

use crate::storage_class::StorageClass;

#[derive(Error, Debug)]
pub enum DataStoreError {
    /// Some address in `[address, address + count)` has no defined value
    #[error("Address range out of bounds: address {address}, count {count}")]
    OutOfRange { address: u32, count: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid value {value} for {class} (expected 0 or 1)")]
    InvalidValue { class: StorageClass, value: u16 },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DataStoreError>;

impl From<sqlx::Error> for DataStoreError {
    fn from(err: sqlx::Error) -> Self {
        DataStoreError::Storage(err.to_string())
    }
}

impl From<figment::Error> for DataStoreError {
    fn from(err: figment::Error) -> Self {
        DataStoreError::Config(err.to_string())
    }
}
