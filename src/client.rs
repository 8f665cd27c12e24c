//! Client for the translation API
//!
//! Calls never fail outward: translation problems are reported in
//! [`TranslationResult::error`], detection problems fall back to English.
//! Successful translations are recorded in the local history.

use crate::db::{HistoryEntry, KeyValueStore};
use crate::history::HistoryStore;
use crate::languages::DEFAULT_LANGUAGE;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of a client translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationResult {
    fn success(translated_text: impl Into<String>) -> Self {
        Self {
            translated_text: translated_text.into(),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            translated_text: String::new(),
            error: Some(error),
        }
    }

    /// A non-empty error is authoritative
    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateBody<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Serialize)]
struct DetectBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiReply {
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    detected_language: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct TranslationClient<S> {
    http: reqwest::Client,
    base_url: String,
    history: HistoryStore<S>,
}

impl<S: KeyValueStore> TranslationClient<S> {
    pub fn new(base_url: &str, store: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            history: HistoryStore::new(store),
        }
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Translate `text`, recording successful results in history
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> TranslationResult {
        if text.trim().is_empty() {
            return TranslationResult::success("");
        }
        if source_language == target_language {
            return TranslationResult::success(text);
        }

        let body = TranslateBody {
            text,
            source_language,
            target_language,
        };

        let reply = match self.post("/api/translate", &body, "Translation failed").await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Translation service error: {}", e);
                return TranslationResult::failure(e.to_string());
            }
        };

        let translated_text = reply.translated_text.unwrap_or_default();
        if !translated_text.is_empty() {
            self.history
                .add(HistoryEntry::new(
                    text,
                    translated_text.as_str(),
                    source_language,
                    target_language,
                ))
                .await;
        }

        TranslationResult::success(translated_text)
    }

    /// Detect the language of `text`, English on any failure
    pub async fn detect(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return DEFAULT_LANGUAGE.to_string();
        }

        match self
            .post("/api/detect", &DetectBody { text }, "Language detection failed")
            .await
        {
            Ok(reply) => reply
                .detected_language
                .filter(|code| !code.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            Err(e) => {
                warn!("Language detection error: {}", e);
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B, fallback: &str) -> Result<ApiReply> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(body).send().await?;
        let success = response.status().is_success();
        let reply: ApiReply = response.json().await?;

        if !success {
            bail!(reply
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| fallback.to_string()));
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TranslationClient<MemoryStore> {
        TranslationClient::new(&server.uri(), MemoryStore::new())
    }

    #[tokio::test]
    async fn test_success_records_history() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/translate"))
            .and(body_json(json!({
                "text": "Good morning",
                "sourceLanguage": "en",
                "targetLanguage": "es"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "translatedText": "Buenos días" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client.translate("Good morning", "en", "es").await;
        assert_eq!(result, TranslationResult::success("Buenos días"));
        assert!(!result.is_error());

        let history = client.history().list().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].source_text, "Good morning");
        assert_eq!(history[0].translated_text, "Buenos días");
        assert_eq!(history[0].source_language, "en");
        assert_eq!(history[0].target_language, "es");
    }

    #[tokio::test]
    async fn test_short_circuits_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.translate("  \n", "en", "fr").await, TranslationResult::success(""));
        assert_eq!(client.translate("Salut", "fr", "fr").await, TranslationResult::success("Salut"));
        assert_eq!(client.detect("   ").await, "en");
        assert!(client.history().list().await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_uses_payload_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/translate"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "quota exceeded" })),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let result = client.translate("Hello", "en", "fr").await;
        assert!(result.is_error());
        assert_eq!(result.error.as_deref(), Some("quota exceeded"));
        assert_eq!(result.translated_text, "");
        assert!(client.history().list().await.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_without_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({})))
            .mount(&server)
            .await;

        let result = client(&server).translate("Hello", "en", "fr").await;
        assert_eq!(result.error.as_deref(), Some("Translation failed"));
    }

    #[tokio::test]
    async fn test_network_failure_is_captured() {
        let client = TranslationClient::new("http://127.0.0.1:1", MemoryStore::new());

        let result = client.translate("Hello", "en", "fr").await;
        assert!(result.is_error());
        assert_eq!(result.translated_text, "");
        assert_eq!(client.detect("Hallo").await, "en");
    }

    #[tokio::test]
    async fn test_empty_translation_not_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translatedText": "" })))
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(client.translate("Hello", "en", "fr").await, TranslationResult::success(""));
        assert!(client.history().list().await.is_empty());
    }

    #[tokio::test]
    async fn test_detect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/detect"))
            .and(body_json(json!({ "text": "Guten Tag" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "detectedLanguage": "de" })),
            )
            .mount(&server)
            .await;

        assert_eq!(client(&server).detect("Guten Tag").await, "de");
    }

    #[tokio::test]
    async fn test_detect_error_defaults_to_english() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).detect("Guten Tag").await, "en");
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(TranslationResult::success("Hola")).unwrap();
        assert_eq!(json, json!({ "translatedText": "Hola" }));

        let json = serde_json::to_value(TranslationResult::failure("nope".to_string())).unwrap();
        assert_eq!(json, json!({ "translatedText": "", "error": "nope" }));
    }
}
