//! Supported languages
//!
//! Static registry of ISO 639-1 codes with English and native names.

use serde::Serialize;

/// Code returned whenever a language cannot be determined
pub const DEFAULT_LANGUAGE: &str = "en";

/// A supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<&'static str>,
}

const fn lang(
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    flag: &'static str,
) -> Language {
    Language {
        code,
        name,
        native_name,
        flag: Some(flag),
    }
}

pub static SUPPORTED_LANGUAGES: &[Language] = &[
    lang("en", "English", "English", "🇺🇸"),
    lang("es", "Spanish", "Español", "🇪🇸"),
    lang("fr", "French", "Français", "🇫🇷"),
    lang("de", "German", "Deutsch", "🇩🇪"),
    lang("it", "Italian", "Italiano", "🇮🇹"),
    lang("pt", "Portuguese", "Português", "🇵🇹"),
    lang("ru", "Russian", "Русский", "🇷🇺"),
    lang("zh", "Chinese", "中文", "🇨🇳"),
    lang("ja", "Japanese", "日本語", "🇯🇵"),
    lang("ko", "Korean", "한국어", "🇰🇷"),
    lang("ar", "Arabic", "العربية", "🇸🇦"),
    lang("hi", "Hindi", "हिन्दी", "🇮🇳"),
    lang("nl", "Dutch", "Nederlands", "🇳🇱"),
    lang("pl", "Polish", "Polski", "🇵🇱"),
    lang("tr", "Turkish", "Türkçe", "🇹🇷"),
    lang("vi", "Vietnamese", "Tiếng Việt", "🇻🇳"),
    lang("th", "Thai", "ไทย", "🇹🇭"),
    lang("id", "Indonesian", "Bahasa Indonesia", "🇮🇩"),
    lang("uk", "Ukrainian", "Українська", "🇺🇦"),
    lang("cs", "Czech", "Čeština", "🇨🇿"),
];

/// Look up a language by its code
pub fn lookup(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Check if a language code is supported
pub fn is_supported(code: &str) -> bool {
    lookup(code).is_some()
}

/// Map a locale tag such as `fr-FR` or `pt_BR.UTF-8` to a supported code,
/// falling back to English
pub fn from_locale(locale: &str) -> &'static str {
    let primary = locale
        .split(['-', '_', '.'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    lookup(&primary).map(|lang| lang.code).unwrap_or(DEFAULT_LANGUAGE)
}
