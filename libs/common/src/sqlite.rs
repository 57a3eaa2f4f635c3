//! SQLite client module
//!
//! Provides the SQLite client used by durable data blocks.

pub mod client;

pub use client::{SqliteClient, SqlitePool};
