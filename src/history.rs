//! Translation history
//!
//! The whole list is stored as one JSON array, newest first, capped at
//! [`MAX_HISTORY_ITEMS`]. Every write replaces the full collection, so two
//! processes writing at once can lose an entry.
//!
//! Storage problems never reach the caller: they are logged and the
//! operation degrades to an empty read or a skipped write.

use crate::db::{HistoryEntry, KeyValueStore};
use crate::error::StorageError;
use rand::Rng;
use tracing::warn;

pub const HISTORY_KEY: &str = "translationHistory";
pub const MAX_HISTORY_ITEMS: usize = 50;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_FRAGMENT_LEN: usize = 13;

/// Two random base-36 fragments concatenated. Not collision-proof.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_FRAGMENT_LEN * 2)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All entries, newest first
    pub async fn list(&self) -> Vec<HistoryEntry> {
        match self.read().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error reading translation history: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepend an entry, evicting the oldest beyond the cap
    pub async fn add(&self, entry: HistoryEntry) {
        let mut entries = self.list().await;
        entries.insert(0, entry);
        entries.truncate(MAX_HISTORY_ITEMS);

        if let Err(e) = self.write(&entries).await {
            warn!("Error storing translation history: {}", e);
        }
    }

    /// Remove the entry with `id`; absent ids are ignored
    pub async fn delete_by_id(&self, id: &str) {
        let entries: Vec<_> = self
            .list()
            .await
            .into_iter()
            .filter(|entry| entry.id != id)
            .collect();

        if let Err(e) = self.write(&entries).await {
            warn!("Error deleting translation history item: {}", e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(HISTORY_KEY).await {
            warn!("Error clearing translation history: {}", e);
        }
    }

    async fn read(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        match self.store.get(HISTORY_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(HISTORY_KEY, &json).await
    }
}
