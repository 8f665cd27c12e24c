//! Verba - LLM-backed text translation
//!
//! An HTTP service that forwards text to a generative model for translation
//! and language detection, plus a client that keeps a local history of
//! completed translations.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod languages;
pub mod preferences;
pub mod services;

pub use config::Config;
pub use db::Database;
