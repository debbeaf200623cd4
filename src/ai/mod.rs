//! AI content generation.
//!
//! Providers speak to a completion API asynchronously. The workflow engine is
//! synchronous, so it talks to a [`ContentGenerator`]; [`BlockingGenerator`]
//! bridges the two and retries transient failures.

mod generator;
mod ollama;
mod openai;
mod prompts;

pub use generator::{BlockingGenerator, ContentGenerator, OfflineGenerator, ScriptedGenerator};
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use prompts::{render, PromptKind};

use async_trait::async_trait;

use crate::core::AiConfig;

/// Generated text and the number of tokens it cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens: u32,
}

impl Completion {
    pub fn new(text: impl Into<String>, tokens: u32) -> Self {
        Self { text: text.into(), tokens }
    }
}

/// Trait for AI providers.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Send a single user prompt and return the reply.
    async fn complete(&self, prompt: &str) -> Result<Completion, AIError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// AI error types.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to connect: {0}")]
    Connection(String),

    #[error("Request was not authorized: {0}")]
    Auth(String),

    #[error("Request was invalid: {0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("No response from AI")]
    NoResponse,
}

impl AIError {
    /// Whether sending the same request again may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }

    /// Classify an unsuccessful HTTP status.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = format!("{status}: {body}");
        match status.as_u16() {
            401 | 403 => Self::Auth(message),
            400 | 404 | 422 => Self::InvalidRequest(message),
            429 => Self::RateLimited(message),
            408 | 504 => Self::Timeout(message),
            _ => Self::Api(message),
        }
    }
}

impl From<reqwest::Error> for AIError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_status(status, e.to_string())
        } else if e.is_decode() {
            Self::NoResponse
        } else {
            Self::Api(e.to_string())
        }
    }
}

/// Build the provider named in the configuration.
pub fn provider_from_config(config: &AiConfig) -> anyhow::Result<Box<dyn AIProvider>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(
            OpenAIProvider::new()?.with_model(&config.model).with_base_url(&config.base_url),
        )),
        "ollama" => Ok(Box::new(
            OllamaProvider::new()
                .with_model(&config.ollama.model)
                .with_base_url(&config.ollama.base_url),
        )),
        other => anyhow::bail!("Unknown AI provider '{other}' (expected openai or ollama)"),
    }
}
