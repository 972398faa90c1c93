use super::sqlite::SqliteStore;
use crate::config::Config;
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the configured SQLite store, creating the file and schema on first use.
pub async fn open_store(config: &Config) -> Result<SqliteStore> {
    let Some(db_path) = config.store.resolve_path(&config.workspace_dir) else {
        // An in-memory database lives as long as its one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory store")?;
        return SqliteStore::new(pool)
            .await
            .context("Failed to initialize in-memory store");
    };

    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create store directory: {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.store.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open store: {}", db_path.display()))?;

    tracing::debug!(path = %db_path.display(), "store opened");

    SqliteStore::new(pool)
        .await
        .with_context(|| format!("Failed to initialize store schema: {}", db_path.display()))
}
