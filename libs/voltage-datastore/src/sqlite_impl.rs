//! SQLite-backed persistent data block
//!
//! All four storage classes can share one table, keyed by
//! `(storage_class, address)`:
//!
//! ```sql
//! CREATE TABLE modbus_slave (
//!     storage_class TEXT    NOT NULL,  -- d / c / i / h
//!     address       INTEGER NOT NULL,
//!     value         INTEGER NOT NULL,
//!     UNIQUE (storage_class, address)
//! )
//! ```
//!
//! `SqliteStore` owns the table and its connection; each `SqliteBlock` is a
//! per-class view holding an `Arc` to the store.

use async_trait::async_trait;
use common::sqlite::{SqliteClient, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{DataStoreError, Result};
use crate::storage_class::StorageClass;
use crate::traits::{range_end, DataBlock};

/// Durable table shared by the per-class blocks
pub struct SqliteStore {
    client: SqliteClient,
    table: String,
}

impl SqliteStore {
    /// Open the database at `url` and create `table` if it does not exist
    pub async fn open(url: &str, table: &str) -> Result<Arc<Self>> {
        validate_table_name(table)?;
        let client = SqliteClient::connect(url)
            .await
            .map_err(|e| DataStoreError::Storage(format!("{:#}", e)))?;
        Self::from_client(client, table).await
    }

    /// Use an already connected client
    pub async fn from_client(client: SqliteClient, table: &str) -> Result<Arc<Self>> {
        validate_table_name(table)?;
        let store = Self {
            client,
            table: table.to_string(),
        };
        sqlx::query(&store.create_table_sql())
            .execute(store.pool())
            .await?;

        info!("Persistent data store ready: table {} at {}", store.table, store.client.url());
        Ok(Arc::new(store))
    }

    /// Per-class view onto this store
    pub fn block(self: &Arc<Self>, class: StorageClass) -> SqliteBlock {
        SqliteBlock {
            store: Arc::clone(self),
            class,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pool(&self) -> &SqlitePool {
        self.client.pool()
    }

    /// Number of rows stored for `class`
    pub async fn row_count(&self, class: StorageClass) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE storage_class = ?",
            self.table
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(class.code())
            .fetch_one(self.pool())
            .await?;
        Ok(count as u64)
    }

    /// Drop and recreate the table in one transaction
    ///
    /// Clears every storage class sharing the table.
    pub async fn recreate(&self) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&self.create_table_sql())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Persistent data store reset: table {}", self.table);
        Ok(())
    }

    fn create_table_sql(&self) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                storage_class TEXT NOT NULL,
                address INTEGER NOT NULL,
                value INTEGER NOT NULL,
                UNIQUE (storage_class, address)
            )
            "#,
            self.table
        )
    }
}

/// Table names are spliced into SQL, so only plain identifiers are accepted
fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DataStoreError::Config(format!(
            "Invalid table name '{}': expected [A-Za-z_][A-Za-z0-9_]*",
            table
        )))
    }
}

/// Half-open `[address, address + count)` as SQLite integers
fn sql_bounds(address: u32, count: usize) -> (i64, i64) {
    let end = range_end(address, count)
        .and_then(|end| i64::try_from(end).ok())
        .unwrap_or(i64::MAX);
    (i64::from(address), end)
}

/// One storage class of a `SqliteStore`
pub struct SqliteBlock {
    store: Arc<SqliteStore>,
    class: StorageClass,
}

impl SqliteBlock {
    pub fn class(&self) -> StorageClass {
        self.class
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }
}

#[async_trait]
impl DataBlock for SqliteBlock {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn contains(&self, address: u32, count: usize) -> Result<bool> {
        if count == 0 {
            return Ok(true);
        }
        let (start, end) = sql_bounds(address, count);
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE storage_class = ? AND address >= ? AND address < ?",
            self.store.table
        );
        let rows: i64 = sqlx::query_scalar(&sql)
            .bind(self.class.code())
            .bind(start)
            .bind(end)
            .fetch_one(self.store.pool())
            .await?;

        Ok(usize::try_from(rows).is_ok_and(|rows| rows == count))
    }

    /// Returns fewer than `count` values when rows are missing
    async fn read(&self, address: u32, count: usize) -> Result<Vec<u16>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let (start, end) = sql_bounds(address, count);
        let sql = format!(
            r#"
            SELECT value FROM {}
            WHERE storage_class = ? AND address >= ? AND address < ?
            ORDER BY address ASC
            "#,
            self.store.table
        );
        let rows: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(self.class.code())
            .bind(start)
            .bind(end)
            .fetch_all(self.store.pool())
            .await?;

        rows.into_iter()
            .map(|value| {
                u16::try_from(value).map_err(|_| {
                    DataStoreError::Storage(format!(
                        "Stored {} value {} does not fit a register",
                        self.class, value
                    ))
                })
            })
            .collect()
    }

    /// Upsert every value in one transaction
    async fn write(&self, address: u32, values: &[u16]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let sql = format!(
            r#"
            INSERT INTO {} (storage_class, address, value)
            VALUES (?, ?, ?)
            ON CONFLICT(storage_class, address) DO UPDATE SET value = excluded.value
            "#,
            self.store.table
        );

        let mut tx = self.store.pool().begin().await?;
        let mut affected = 0u64;
        for (offset, &value) in values.iter().enumerate() {
            let result = sqlx::query(&sql)
                .bind(self.class.code())
                .bind(i64::from(address) + offset as i64)
                .bind(i64::from(value))
                .execute(&mut *tx)
                .await?;
            affected += result.rows_affected();
        }

        if affected != values.len() as u64 {
            tx.rollback().await?;
            warn!(
                "Rolled back {} write at {}: {} of {} rows affected",
                self.class,
                address,
                affected,
                values.len()
            );
            return Err(DataStoreError::Storage(format!(
                "Write of {} values at {} affected {} rows",
                values.len(),
                address,
                affected
            )));
        }

        tx.commit().await?;
        debug!("Persisted {} {} values at {}", values.len(), self.class, address);
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.store.recreate().await
    }

    fn supports_reset(&self) -> bool {
        true
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
