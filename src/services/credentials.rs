//! API key selection
//!
//! Several keys may be configured under a shared prefix (`GOOGLE_API_KEY`,
//! `GOOGLE_API_KEY_1`, ...). One is picked at random per call to spread
//! usage across quota-limited keys.

use crate::error::CredentialError;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Prefix for Gemini keys
pub const GOOGLE_KEY_PREFIX: &str = "GOOGLE_API_KEY";

/// Prefix for Groq keys
pub const GROQ_KEY_PREFIX: &str = "GROQ_API_KEY";

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    /// All variables, or `None` when no process environment is reachable
    fn vars(&self) -> Option<Vec<(String, String)>>;
}

/// The real process environment
///
/// Variables whose name or value is not valid Unicode are skipped.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn vars(&self) -> Option<Vec<(String, String)>> {
        Some(
            std::env::vars_os()
                .filter_map(|(name, value)| {
                    Some((name.into_string().ok()?, value.into_string().ok()?))
                })
                .collect(),
        )
    }
}

/// A fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct StaticEnv(pub Vec<(String, String)>);

impl EnvSource for StaticEnv {
    fn vars(&self) -> Option<Vec<(String, String)>> {
        Some(self.0.clone())
    }
}

/// A context without a process environment
pub struct NoEnv;

impl EnvSource for NoEnv {
    fn vars(&self) -> Option<Vec<(String, String)>> {
        None
    }
}

/// Picks API keys from an injected environment
#[derive(Clone)]
pub struct CredentialSelector {
    source: Arc<dyn EnvSource>,
}

impl CredentialSelector {
    pub fn new(source: impl EnvSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_process_env() -> Self {
        Self::new(ProcessEnv)
    }

    /// All non-empty keys whose variable name starts with `prefix`
    pub fn keys(&self, prefix: &str) -> Result<Vec<String>, CredentialError> {
        let vars = self
            .source
            .vars()
            .ok_or(CredentialError::EnvironmentUnavailable)?;

        Ok(vars
            .into_iter()
            .filter(|(name, value)| name.starts_with(prefix) && !value.is_empty())
            .map(|(_, value)| value)
            .collect())
    }

    /// Pick one key uniformly at random
    pub fn select_key(&self, prefix: &str) -> Result<String, CredentialError> {
        let keys = self.keys(prefix)?;
        keys.choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| CredentialError::NoKeys {
                prefix: prefix.to_string(),
            })
    }
}
