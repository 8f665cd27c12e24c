//! Translation pipeline - template render, model call, text extraction
//!
//! Translation failures are surfaced to the caller. Detection failures are
//! masked and answered with English.

use crate::error::TranslationError;
use crate::languages::{self, DEFAULT_LANGUAGE};
use crate::services::model::GenerativeModel;
use crate::services::prompt::PromptTemplates;
use std::sync::Arc;
use tracing::{debug, warn};

/// What an operation does when its model call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the error
    FailClosed,
    /// Log the error and answer with a fixed value
    FailOpenWithDefault(&'static str),
}

impl FailurePolicy {
    fn apply(
        self,
        operation: &str,
        result: Result<String, TranslationError>,
    ) -> Result<String, TranslationError> {
        match (self, result) {
            (FailurePolicy::FailOpenWithDefault(default), Err(e)) => {
                warn!("{} failed: {}, defaulting to '{}'", operation, e, default);
                Ok(default.to_string())
            }
            (_, result) => result,
        }
    }
}

pub const TRANSLATE_POLICY: FailurePolicy = FailurePolicy::FailClosed;
pub const DETECT_POLICY: FailurePolicy = FailurePolicy::FailOpenWithDefault(DEFAULT_LANGUAGE);

/// Prompt pipeline over an injected model
pub struct TranslationPipeline {
    model: Arc<dyn GenerativeModel>,
    templates: PromptTemplates,
    translate_policy: FailurePolicy,
    detect_policy: FailurePolicy,
}

impl TranslationPipeline {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Result<Self, TranslationError> {
        Ok(Self {
            model,
            templates: PromptTemplates::new()?,
            translate_policy: TRANSLATE_POLICY,
            detect_policy: DETECT_POLICY,
        })
    }

    #[cfg(test)]
    pub fn with_detect_policy(mut self, policy: FailurePolicy) -> Self {
        self.detect_policy = policy;
        self
    }

    /// Translate text between two registry languages
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if source_language == target_language {
            return Ok(text.to_string());
        }

        let source = languages::lookup(source_language)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(source_language.to_string()))?;
        let target = languages::lookup(target_language)
            .ok_or_else(|| TranslationError::UnsupportedLanguage(target_language.to_string()))?;

        debug!("Translating {} -> {}", source.code, target.code);

        let result = async {
            let prompt = self.templates.translation(source.name, target.name, text)?;
            let output = self.model.generate(&prompt).await?;
            Ok::<_, TranslationError>(output.trim().to_string())
        }
        .await;

        self.translate_policy.apply("Translation", result)
    }

    /// Detect the ISO 639-1 code of `text`
    pub async fn detect_language(&self, text: &str) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(DEFAULT_LANGUAGE.to_string());
        }

        let result = async {
            let prompt = self.templates.detection(text)?;
            let output = self.model.generate(&prompt).await?;
            Ok::<_, TranslationError>(normalize_language_code(&output))
        }
        .await;

        self.detect_policy.apply("Language detection", result)
    }
}

/// Lower-case, keep the first two characters, fall back to English.
///
/// The result is not checked against the registry: an answer such as
/// "uncertain" becomes "un".
fn normalize_language_code(raw: &str) -> String {
    let code: String = raw.trim().to_lowercase().chars().take(2).collect();

    if code.is_empty() {
        return DEFAULT_LANGUAGE.to_string();
    }
    if !languages::is_supported(&code) {
        warn!("Detected language '{}' is not in the registry", code);
    }
    code
}
