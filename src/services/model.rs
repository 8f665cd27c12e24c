//! Generative model clients
//!
//! Gemini is the primary provider; Groq speaks the OpenAI chat format and can
//! be swapped in through configuration.

use crate::config::{ModelConfig, Provider};
use crate::error::ModelError;
use crate::services::credentials::{CredentialSelector, GOOGLE_KEY_PREFIX, GROQ_KEY_PREFIX};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A text-in, text-out language model
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Environment prefix of the provider's API keys
pub fn key_prefix(provider: Provider) -> &'static str {
    match provider {
        Provider::Gemini => GOOGLE_KEY_PREFIX,
        Provider::Groq => GROQ_KEY_PREFIX,
    }
}

/// Build the client for the configured provider
pub fn build(config: &ModelConfig, credentials: CredentialSelector) -> Arc<dyn GenerativeModel> {
    match config.provider {
        Provider::Gemini => Arc::new(GeminiModel::new(config, credentials)),
        Provider::Groq => Arc::new(GroqModel::new(config, credentials)),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ModelError::Api { status, body })
}

// ==================== Gemini ====================

/// Google Generative Language API client
pub struct GeminiModel {
    config: ModelConfig,
    credentials: CredentialSelector,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiModel {
    pub fn new(config: &ModelConfig, credentials: CredentialSelector) -> Self {
        Self {
            config: config.clone(),
            credentials,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = self.credentials.select_key(GOOGLE_KEY_PREFIX)?;

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url(),
            self.config.model()
        );

        debug!("Calling Gemini model {}", self.config.model());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let result: GenerateResponse = check_status(response).await?.json().await?;

        let text: String = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        Ok(text)
    }
}

// ==================== Groq ====================

/// OpenAI-compatible chat completion client for Groq
pub struct GroqModel {
    config: ModelConfig,
    credentials: CredentialSelector,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

impl GroqModel {
    pub fn new(config: &ModelConfig, credentials: CredentialSelector) -> Self {
        Self {
            config: config.clone(),
            credentials,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GroqModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let api_key = self.credentials.select_key(GROQ_KEY_PREFIX)?;

        let request = ChatRequest {
            model: self.config.model(),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let url = format!("{}/chat/completions", self.config.api_url());

        debug!("Calling Groq model {}", self.config.model());

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let result: ChatResponse = check_status(response).await?.json().await?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted model for exercising the pipeline without a network

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub struct ScriptedModel {
        reply: Result<String, u16>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        /// Always answers with `reply`
        pub fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        /// Always fails with an API error of the given status
        pub fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ModelError::Api {
                    status: *status,
                    body: "quota exceeded".to_string(),
                }),
            }
        }
    }
}
