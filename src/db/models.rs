//! Persisted records

use serde::{Deserialize, Serialize};

/// One completed translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub source_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Create an entry stamped with a fresh id and the current time
    pub fn new(
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::history::generate_id(),
            source_text: source_text.into(),
            translated_text: translated_text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Last selected source/target pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePreferences {
    pub source: String,
    pub target: String,
}
