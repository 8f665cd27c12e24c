//! Error types for Verba

use thiserror::Error;

/// Failure to obtain an API key
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Environment variables can only be accessed server-side")]
    EnvironmentUnavailable,

    #[error("No API keys available in environment variables (prefix {prefix})")]
    NoKeys { prefix: String },
}

/// Failure of a single generative model invocation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Failure of a prompt pipeline operation
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Invalid language code: {0}")]
    UnsupportedLanguage(String),

    #[error("Failed to render prompt: {0}")]
    Prompt(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure of the local key-value store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
