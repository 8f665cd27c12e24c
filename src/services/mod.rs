//! Translation services

pub mod credentials;
pub mod model;
pub mod prompt;
pub mod translator;

pub use credentials::CredentialSelector;
pub use translator::TranslationPipeline;
