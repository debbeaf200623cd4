//! OpenAI API integration.
//!
//! Implements the AIProvider trait for OpenAI chat completion models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AIError, AIProvider, Completion};

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// Reads API key from OPENAI_API_KEY environment variable.
    pub fn new() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: "gpt-3.5-turbo-16k".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a custom base URL (for compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, prompt: &str) -> Result<Completion, AIError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage { role: "user".to_string(), content: prompt.to_string() }],
            n: 1,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AIError::from_status(status, body));
        }

        let response: OpenAIResponse = response.json().await?;
        let tokens = response.usage.map_or(0, |u| u.total_tokens);

        response
            .choices
            .into_iter()
            .next()
            .map(|c| Completion::new(c.message.content.trim(), tokens))
            .ok_or(AIError::NoResponse)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    n: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(openai_env)]
    fn test_openai_provider_requires_api_key() {
        let original = std::env::var("OPENAI_API_KEY").ok();
        std::env::remove_var("OPENAI_API_KEY");

        let result = OpenAIProvider::new();

        if let Some(val) = original {
            std::env::set_var("OPENAI_API_KEY", val);
        }

        assert!(result.is_err());
    }

    #[test]
    #[serial(openai_env)]
    fn test_openai_provider_builder() {
        let original = std::env::var("OPENAI_API_KEY").ok();
        std::env::set_var("OPENAI_API_KEY", "test-key");

        let provider = OpenAIProvider::new()
            .unwrap()
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(provider.model, "gpt-4o-mini");
        assert_eq!(provider.base_url, "http://localhost:8080/v1");

        match original {
            Some(val) => std::env::set_var("OPENAI_API_KEY", val),
            None => std::env::remove_var("OPENAI_API_KEY"),
        }
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "choices": [{ "message": { "role": "assistant", "content": "  The Quiet Tide \n" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
        }"#;
        let response: OpenAIResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.usage.unwrap().total_tokens, 17);
        assert_eq!(response.choices[0].message.content.trim(), "The Quiet Tide");
    }
}
