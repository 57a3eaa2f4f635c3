use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool as SqlxSqlitePool,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = SqlxSqlitePool;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite client holding a single long-lived session
///
/// The pool is capped at one connection that never idles out, so every
/// statement runs on the same session. This keeps `sqlite::memory:`
/// databases alive for the lifetime of the client and serialises access
/// to the backing file.
#[derive(Clone)]
pub struct SqliteClient {
    pool: Arc<SqlitePool>,
    url: String,
}

impl SqliteClient {
    /// Open a database from a connection URI
    ///
    /// Accepts `sqlite://path/to/file.db?mode=rwc`, `sqlite:file.db` and
    /// `sqlite::memory:`. Missing database files and their parent
    /// directories are created.
    pub async fn connect(url: &str) -> Result<Self> {
        if !url.starts_with("sqlite:") {
            anyhow::bail!("Unsupported database URI (expected sqlite:...): {}", url);
        }
        let in_memory = is_memory_url(url);

        let mut options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite connection URI: {}", url))?
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
            }

            options = options
                .journal_mode(SqliteJournalMode::Wal) // Enable WAL for concurrent readers
                .synchronous(SqliteSynchronous::Normal); // Balance performance and safety
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open SQLite database: {}", url))?;

        info!("SQLite database connected: {}", url);

        Ok(Self {
            pool: Arc::new(pool),
            url: url.to_string(),
        })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
            url: "from_pool".to_string(),
        }
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Connection URI the client was opened with
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if database is accessible
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&*self.pool).await?;
        Ok(())
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
