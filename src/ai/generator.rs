//! Synchronous content generation for the workflow engine.

use std::collections::VecDeque;

use tokio::runtime::{Builder, Runtime};

use super::{provider_from_config, AIError, AIProvider, Completion};
use crate::core::{retry_async_if, AiConfig, RetryConfig};

/// Produces text for a prompt.
///
/// `None` means the request failed for good; the caller keeps whatever value
/// it had.
pub trait ContentGenerator {
    fn generate(&mut self, prompt: &str) -> Option<Completion>;
}

/// Runs an async provider to completion on a private runtime.
///
/// Timeouts and connection failures are retried with backoff. Other failures
/// are logged and reported as `None`.
pub struct BlockingGenerator {
    provider: Box<dyn AIProvider>,
    retry: RetryConfig,
    runtime: Runtime,
}

impl BlockingGenerator {
    pub fn new(provider: Box<dyn AIProvider>, retry: RetryConfig) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { provider, retry, runtime })
    }

    /// Build the configured provider with the configured retry budget.
    pub fn from_config(config: &AiConfig) -> anyhow::Result<Self> {
        Self::new(provider_from_config(config)?, RetryConfig::api(config.max_attempts))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl ContentGenerator for BlockingGenerator {
    fn generate(&mut self, prompt: &str) -> Option<Completion> {
        let provider = self.provider.as_ref();
        let limit = self.retry.attempt_timeout;
        tracing::debug!(provider = provider.name(), %prompt, "sending prompt");

        let outcome = self.runtime.block_on(retry_async_if(
            &self.retry,
            move || async move {
                match limit {
                    Some(limit) => tokio::time::timeout(limit, provider.complete(prompt))
                        .await
                        .unwrap_or_else(|_| {
                            Err(AIError::Timeout(format!("no reply within {}s", limit.as_secs())))
                        }),
                    None => provider.complete(prompt).await,
                }
            },
            AIError::is_transient,
        ));

        let attempts = outcome.attempts;
        match outcome.into_result() {
            Ok(completion) => {
                tracing::debug!(tokens = completion.tokens, attempts, "received completion");
                Some(completion)
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    attempts,
                    error = %e,
                    "generation failed"
                );
                None
            }
        }
    }
}

/// Stands in when no provider could be set up; every request fails.
///
/// Manual editing still works.
#[derive(Debug, Clone)]
pub struct OfflineGenerator {
    reason: String,
}

impl OfflineGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl ContentGenerator for OfflineGenerator {
    fn generate(&mut self, _prompt: &str) -> Option<Completion> {
        tracing::warn!(reason = %self.reason, "content generation is unavailable");
        None
    }
}

/// Generator that replays prepared replies and records the prompts it got.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replies: VecDeque<Option<String>>,
    prompts: Vec<String>,
}

impl ScriptedGenerator {
    /// Replies returned in order. Once they run out every request fails.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { replies: replies.into_iter().map(|r| Some(r.into())).collect(), prompts: Vec::new() }
    }

    /// Queue a failed request.
    pub fn then_fail(mut self) -> Self {
        self.replies.push_back(None);
        self
    }

    /// Queue a successful reply.
    pub fn then_reply(mut self, reply: impl Into<String>) -> Self {
        self.replies.push_back(Some(reply.into()));
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl ContentGenerator for ScriptedGenerator {
    fn generate(&mut self, prompt: &str) -> Option<Completion> {
        self.prompts.push(prompt.to_string());
        let text = self.replies.pop_front().flatten()?;
        let tokens = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
        Some(Completion::new(text, tokens))
    }
}
