//! Configuration management for Verba

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Restricts cross-origin access to `public_url`
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            production: false,
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Generative model provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Groq,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "groq" => Ok(Provider::Groq),
            _ => Err(anyhow!("Unknown model provider: {}", s)),
        }
    }
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Groq => "groq",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: Provider,
    /// Base URL, provider default when unset
    #[serde(default)]
    pub api_url: Option<String>,
    /// Model name, provider default when unset
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_url: None,
            model: None,
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

impl ModelConfig {
    pub fn api_url(&self) -> &str {
        match (&self.api_url, self.provider) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, Provider::Gemini) => "https://generativelanguage.googleapis.com/v1beta",
            (None, Provider::Groq) => "https://api.groq.com/openai/v1",
        }
    }

    pub fn model(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, Provider::Gemini) => "gemini-2.5-flash-preview-04-17",
            (None, Provider::Groq) => "llama-3.3-70b-versatile",
        }
    }
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "verba.db".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;

            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?;

            config.expand_env_vars();
            return Ok(config);
        }

        Self::from_env()
    }

    /// Load configuration entirely from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match var("MODEL_PROVIDER") {
            Some(name) => name.parse::<Provider>().context("Invalid MODEL_PROVIDER")?,
            None => Provider::default(),
        };

        Ok(Config {
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(default_host),
                port: var("PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default_port()),
                production: var("APP_ENV").is_some_and(|v| v == "production"),
                public_url: var("APP_PUBLIC_URL"),
            },
            model: ModelConfig {
                provider,
                api_url: var("MODEL_API_URL"),
                model: var("MODEL_NAME"),
                ..ModelConfig::default()
            },
            database: DatabaseConfig {
                path: var("VERBA_DB_PATH").unwrap_or_else(default_db_path),
            },
            client: ClientConfig {
                server_url: var("VERBA_SERVER_URL").unwrap_or_else(default_server_url),
            },
        })
    }

    /// Expand ${VAR} patterns in string fields
    fn expand_env_vars(&mut self) {
        if let Some(ref mut url) = self.server.public_url {
            *url = expand_env(url);
        }
        if let Some(ref mut url) = self.model.api_url {
            *url = expand_env(url);
        }
        self.database.path = expand_env(&self.database.path);
        self.client.server_url = expand_env(&self.client.server_url);
    }
}

/// Expand ${VAR} patterns in a string
///
/// Substituted values are not expanded again.
fn expand_env(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }

    result.push_str(rest);
    result
}
