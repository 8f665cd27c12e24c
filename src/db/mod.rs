//! Local key-value storage
//!
//! History and preferences are stored as JSON strings under fixed keys, the
//! same way a browser keeps them in local storage.

mod models;
mod schema;

pub use models::*;

use crate::error::StorageError;
use async_trait::async_trait;
use rusqlite::OptionalExtension;
#[cfg(test)]
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::Mutex;
use tokio_rusqlite::Connection;
use tracing::info;

/// String key-value storage capability
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// SQLite-backed store
#[derive(Clone, Debug)]
pub struct Database {
    conn: Arc<Connection>,
}

impl Database {
    /// Open a database file
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path).await?;
        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().await?;
        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(schema::MIGRATIONS)?;
                Ok(())
            })
            .await?;
        info!("Database migrations complete");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let value = conn
                    .query_row("SELECT value FROM kv_store WHERE key = ?", [&key], |row| {
                        row.get(0)
                    })
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(Into::into)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        let value = value.to_string();
        let now = chrono::Utc::now().timestamp();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
                    rusqlite::params![key, value, now],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?", [&key])?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

/// Volatile store, shared between clones
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".to_string()))
    }
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
