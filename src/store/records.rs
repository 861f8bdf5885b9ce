//! Key/value record storage.
//!
//! Each store persists one JSON document under a fixed key and rewrites it in
//! full on every mutation. Reads of absent or corrupt records degrade to the
//! type's default.

use std::future::Future;
use std::pin::Pin;

use chrono::Utc;
use dashmap::DashMap;
use rusqlite::OptionalExtension;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::session::config::StorageConfig;
use crate::store::error::StoreResult;

/// Boxed future type for record store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Record store trait.
pub trait RecordStore: Send + Sync {
    /// Read the raw record under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn read(&self, key: &str) -> StoreFuture<'_, StoreResult<Option<String>>>;

    /// Replace the record under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn write(&self, key: &str, value: String) -> StoreFuture<'_, StoreResult<()>>;

    /// Delete the record under `key`.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn remove(&self, key: &str) -> StoreFuture<'_, StoreResult<()>>;
}

/// `SQLite` implementation of the record store.
pub struct SqliteRecordStore {
    conn: Connection,
    table: String,
}

impl SqliteRecordStore {
    /// Open the database file and create the table.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> StoreResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::with_connection(conn, config.table.clone()).await
    }

    /// In-memory database, mostly for tests.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn in_memory(table: &str) -> StoreResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn, table.to_string()).await
    }

    async fn with_connection(conn: Connection, table: String) -> StoreResult<Self> {
        let table_name = table.clone();
        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }
}

impl RecordStore for SqliteRecordStore {
    fn read(&self, key: &str) -> StoreFuture<'_, StoreResult<Option<String>>> {
        let key = key.to_string();
        Box::pin(async move {
            let table = self.table.clone();
            let value = self
                .conn
                .call(move |conn| {
                    let value: Option<String> = conn
                        .query_row(
                            &format!("SELECT value FROM {table} WHERE key = ?1"),
                            rusqlite::params![key],
                            |row| row.get(0),
                        )
                        .optional()?;
                    Ok(value)
                })
                .await?;
            Ok(value)
        })
    }

    fn write(&self, key: &str, value: String) -> StoreFuture<'_, StoreResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let table = self.table.clone();
            let updated_at = Utc::now().timestamp_millis();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT OR REPLACE INTO {table} (key, value, updated_at)
                             VALUES (?1, ?2, ?3)"
                        ),
                        rusqlite::params![key, value, updated_at],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> StoreFuture<'_, StoreResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let table = self.table.clone();
            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!("DELETE FROM {table} WHERE key = ?1"),
                        rusqlite::params![key],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }
}

/// Process-local record store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, String>,
}

impl MemoryRecordStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw record, bypassing the async interface.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.records.get(key).map(|value| value.value().clone())
    }

    /// Seed a raw record.
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.records.insert(key.to_string(), value.into());
    }
}

impl RecordStore for MemoryRecordStore {
    fn read(&self, key: &str) -> StoreFuture<'_, StoreResult<Option<String>>> {
        let value = self.get(key);
        Box::pin(async move { Ok(value) })
    }

    fn write(&self, key: &str, value: String) -> StoreFuture<'_, StoreResult<()>> {
        self.records.insert(key.to_string(), value);
        Box::pin(async move { Ok(()) })
    }

    fn remove(&self, key: &str) -> StoreFuture<'_, StoreResult<()>> {
        self.records.remove(key);
        Box::pin(async move { Ok(()) })
    }
}

/// Load and decode a record, falling back to the default on any failure.
pub async fn load_or_default<T>(store: &dyn RecordStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.read(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("Failed to read record {key}: {e}");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Discarding corrupt record {key}: {e}");
            T::default()
        }
    }
}

/// Encode and write a record.
///
/// # Errors
/// Returns an error if encoding or storage access fails.
pub async fn save_json<T>(store: &dyn RecordStore, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    let bytes = raw.len();
    store.write(key, raw).await?;
    debug!("Persisted {key} ({bytes} bytes)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryRecordStore::new();
        assert!(store.read("k").await.unwrap().is_none());
        store.write("k", "[1,2]".to_string()).await.unwrap();
        assert_eq!(store.read("k").await.unwrap().as_deref(), Some("[1,2]"));
        store.remove("k").await.unwrap();
        assert!(store.get("k").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_record_degrades_to_default() {
        let store = MemoryRecordStore::new();
        store.insert("broken", "{not json");
        let value: Vec<String> = load_or_default(&store, "broken").await;
        assert!(value.is_empty());
        let missing: Vec<String> = load_or_default(&store, "missing").await;
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_store_replaces_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            sqlite_path: dir.path().join("records.sqlite"),
            ..StorageConfig::default()
        };
        let store = SqliteRecordStore::new(&config).await.unwrap();

        save_json(&store, "history", &vec!["a"]).await.unwrap();
        save_json(&store, "history", &vec!["a", "b"]).await.unwrap();
        let value: Vec<String> = load_or_default(&store, "history").await;
        assert_eq!(value, vec!["a".to_string(), "b".to_string()]);

        store.remove("history").await.unwrap();
        assert!(store.read("history").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_in_memory() {
        let store = SqliteRecordStore::in_memory("records").await.unwrap();
        store.write("x", "1".to_string()).await.unwrap();
        let value: i64 = load_or_default(&store, "x").await;
        assert_eq!(value, 1);
    }
}
