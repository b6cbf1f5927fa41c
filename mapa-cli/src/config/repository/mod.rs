//! Repository layer for the launch-map store

pub mod records;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

/// The lookup page could not read the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreUnavailableError {
    pub database: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for StoreUnavailableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "store {} is unavailable: {}",
            self.database.display(),
            self.reason
        )
    }
}

impl std::error::Error for StoreUnavailableError {}

/// Open the store for ingestion, creating the database file if needed
pub async fn open_for_write(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Delete)
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))
}

/// Open an existing store for a single read
pub async fn open_for_read(path: &Path) -> Result<SqlitePool, StoreUnavailableError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Delete)
        .create_if_missing(false)
        .read_only(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| StoreUnavailableError {
            database: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Quote an SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("dados"), "\"dados\"");
        assert_eq!(
            quote_ident("Responsável (\"GCAT\")"),
            "\"Responsável (\"\"GCAT\"\")\""
        );
    }

    #[tokio::test]
    async fn test_open_for_read_missing_file() {
        let path = std::env::temp_dir().join(format!("mapa-missing-{}.db", uuid::Uuid::new_v4()));
        let err = open_for_read(&path).await.unwrap_err();
        assert_eq!(err.database, path);
    }
}
