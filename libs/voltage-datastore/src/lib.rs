//! VoltageEMS Modbus slave data store
//!
//! Process data a Modbus slave exposes to remote requesters, held in four
//! data blocks (discrete inputs, coils, input registers, holding registers).
//!
//! # Key Components
//!
//! - **DataBlock trait**: addressable storage backend
//! - **SequentialBlock / SparseBlock**: in-memory backends
//! - **SqliteBlock**: durable backend, one table shared by all classes
//! - **SlaveContext**: dispatches requests to blocks after the +1 address shift
//! - **SlaveConfig**: file/environment configuration of the blocks

pub mod config;
pub mod context;
pub mod error;
pub mod sequential;
pub mod sparse;
pub mod sqlite_impl;
pub mod storage_class;
pub mod traits;

// Re-exports
pub use config::{BlockConfig, DatabaseConfig, SlaveConfig, SparseEntry};
pub use context::{block_address, SlaveContext, SlaveContextBuilder};
pub use error::{DataStoreError, Result};
pub use sequential::SequentialBlock;
pub use sparse::SparseBlock;
pub use sqlite_impl::{SqliteBlock, SqliteStore};
pub use storage_class::StorageClass;
pub use traits::DataBlock;
