//! Remembered source/target language pair

use crate::db::{KeyValueStore, LanguagePreferences};
use crate::languages::{self, DEFAULT_LANGUAGE};
use tracing::warn;

pub const PREFERENCES_KEY: &str = "translatorLanguagePreferences";

/// Target suggested when the source is already English
const ENGLISH_SOURCE_TARGET: &str = "ar";

impl LanguagePreferences {
    /// Source from the user's locale, target English (or Arabic for English speakers)
    pub fn for_locale(locale: Option<&str>) -> Self {
        let source = locale.map(languages::from_locale).unwrap_or(DEFAULT_LANGUAGE);
        let target = if source == DEFAULT_LANGUAGE {
            ENGLISH_SOURCE_TARGET
        } else {
            DEFAULT_LANGUAGE
        };

        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored pair, or the locale default when nothing readable is stored
    pub async fn load(&self, locale: Option<&str>) -> LanguagePreferences {
        let stored: Option<LanguagePreferences> = match self.store.get(PREFERENCES_KEY).await {
            Ok(Some(json)) => serde_json::from_str(&json)
                .map_err(|e| warn!("Error reading language preferences: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Error reading language preferences: {}", e);
                None
            }
        };

        stored.unwrap_or_else(|| LanguagePreferences::for_locale(locale))
    }

    pub async fn store(&self, source: &str, target: &str) {
        let prefs = LanguagePreferences {
            source: source.to_string(),
            target: target.to_string(),
        };

        let result = match serde_json::to_string(&prefs) {
            Ok(json) => self.store.set(PREFERENCES_KEY, &json).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = result {
            warn!("Error storing language preferences: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::history::tests::BrokenStore;
    use pretty_assertions::assert_eq;

    fn prefs(source: &str, target: &str) -> LanguagePreferences {
        LanguagePreferences {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_locale_defaults() {
        assert_eq!(LanguagePreferences::for_locale(Some("fr-CA")), prefs("fr", "en"));
        assert_eq!(LanguagePreferences::for_locale(Some("en-US")), prefs("en", "ar"));
        assert_eq!(LanguagePreferences::for_locale(Some("sw")), prefs("en", "ar"));
        assert_eq!(LanguagePreferences::for_locale(None), prefs("en", "ar"));
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let store = PreferenceStore::new(MemoryStore::new());
        assert_eq!(store.load(Some("de_DE.UTF-8")).await, prefs("de", "en"));

        store.store("ja", "ko").await;
        assert_eq!(store.load(Some("de_DE.UTF-8")).await, prefs("ja", "ko"));

        store.store("es", "en").await;
        assert_eq!(store.load(None).await, prefs("es", "en"));
    }

    #[tokio::test]
    async fn test_corrupt_preferences_fall_back() {
        let memory = MemoryStore::new();
        memory.set(PREFERENCES_KEY, "nonsense").await.unwrap();

        let store = PreferenceStore::new(memory);
        assert_eq!(store.load(Some("it")).await, prefs("it", "en"));
    }

    #[tokio::test]
    async fn test_broken_storage() {
        let store = PreferenceStore::new(BrokenStore);
        store.store("fr", "en").await;
        assert_eq!(store.load(None).await, prefs("en", "ar"));
    }
}
