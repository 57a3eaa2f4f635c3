//! `VoltageEMS` basic library for the slave data store
//!
//! Provides infrastructure shared by the data-store crates, including:
//! - logging initialisation (console + daily rolling file)
//! - configuration file loading with environment overrides
//! - SQLite client

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod config_loader;
pub mod logging;

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use tokio;
