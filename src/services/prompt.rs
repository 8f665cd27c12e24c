//! Prompt templates

use crate::error::TranslationError;
use handlebars::Handlebars;
use serde_json::json;

const TRANSLATION: &str = "translation";
const DETECTION: &str = "detection";

const TRANSLATION_TEMPLATE: &str = r#"
You are a professional translator with expertise in multiple languages.

TASK:
Translate the following text from {{source_language}} to {{target_language}}.

SOURCE TEXT:
"""
{{text}}
"""

INSTRUCTIONS:
1. Maintain the original meaning, tone, and nuance in your translation.
2. Preserve formatting, including paragraphs, bullet points, and special characters.
3. If there are idioms or cultural references, adapt them appropriately for the target language.
4. Do not add any explanations or notes to the translation.
5. Return ONLY the translated text, nothing else.

TRANSLATION:
"#;

const DETECTION_TEMPLATE: &str = r#"
You are a language detection expert.

TASK:
Detect the language of the following text and return only the ISO 639-1 language code.

TEXT:
"""
{{text}}
"""

INSTRUCTIONS:
1. Analyze the text and determine the language.
2. Return ONLY the ISO 639-1 language code (e.g., 'en' for English, 'es' for Spanish).
3. If you're unsure, return 'en' as the default.

LANGUAGE CODE:
"#;

/// Registered translation and detection prompts
pub struct PromptTemplates {
    registry: Handlebars<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self, TranslationError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Prompts are plain text; user input must reach the model verbatim.
        registry.register_escape_fn(handlebars::no_escape);

        for (name, template) in [(TRANSLATION, TRANSLATION_TEMPLATE), (DETECTION, DETECTION_TEMPLATE)] {
            registry
                .register_template_string(name, template)
                .map_err(|e| TranslationError::Prompt(e.to_string()))?;
        }

        Ok(Self { registry })
    }

    /// Render the translation prompt using language display names
    pub fn translation(
        &self,
        source_language: &str,
        target_language: &str,
        text: &str,
    ) -> Result<String, TranslationError> {
        self.render(
            TRANSLATION,
            json!({
                "source_language": source_language,
                "target_language": target_language,
                "text": text,
            }),
        )
    }

    pub fn detection(&self, text: &str) -> Result<String, TranslationError> {
        self.render(DETECTION, json!({ "text": text }))
    }

    fn render(&self, name: &str, data: serde_json::Value) -> Result<String, TranslationError> {
        self.registry
            .render(name, &data)
            .map_err(|e| TranslationError::Prompt(e.to_string()))
    }
}
