//! Core plumbing shared by the rest of the crate: configuration and retry.

mod config;
mod retry;

pub use config::{AiConfig, Config, GeneralConfig, OllamaConfig, StorageConfig, DB_PATH_ENV};
pub use retry::{retry_async_if, RetryConfig, RetryResult};
