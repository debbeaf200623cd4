//! Configuration management for autobook.
//!
//! Handles loading configuration from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::book::Category;

/// Environment variable that overrides the book database location.
pub const DB_PATH_ENV: &str = "AUTOBOOK_DB";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Book storage settings
    pub storage: StorageConfig,

    /// AI settings
    pub ai: AiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Category used by `create` when none is given on the command line
    pub category: Category,

    /// Editor command used for manual edits (falls back to $VISUAL / $EDITOR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

/// Book storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON book database (`~` is expanded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// AI integration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// AI provider (openai, ollama)
    pub provider: String,

    /// Model to use with the OpenAI-compatible provider
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// How many times a request is re-sent after a timeout or connection failure
    pub max_attempts: u32,

    /// Ollama-specific settings
    pub ollama: OllamaConfig,
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub base_url: String,

    /// Model to use
    pub model: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.autobook.toml` in current directory
    /// 2. `~/.config/autobook/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".autobook.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the global config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("autobook"))
    }

    /// Get the data directory path (for the book database).
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("autobook"))
    }

    /// Resolve where the book database lives.
    ///
    /// `AUTOBOOK_DB` wins over `[storage] path`, which wins over the data
    /// directory default.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(shellexpand::tilde(&path).into_owned()));
            }
        }

        if let Some(ref path) = self.storage.path {
            return Ok(PathBuf::from(shellexpand::tilde(path).into_owned()));
        }

        Self::data_dir()
            .map(|d| d.join("books.json"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    /// Resolve the editor command: config, then $VISUAL, then $EDITOR, then vi.
    pub fn editor_command(&self) -> String {
        let non_empty = |e: &String| !e.trim().is_empty();
        self.general
            .editor
            .clone()
            .filter(non_empty)
            .or_else(|| std::env::var("VISUAL").ok().filter(non_empty))
            .or_else(|| std::env::var("EDITOR").ok().filter(non_empty))
            .unwrap_or_else(|| "vi".to_string())
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { category: Category::Nonfiction, editor: None }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo-16k".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            max_attempts: 5,
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:11434".to_string(), model: "llama3.2".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.category, Category::Nonfiction);
        assert!(config.general.editor.is_none());
        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.ai.max_attempts, 5);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[ai]"));
        assert!(toml_str.contains("category = \"nonfiction\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            editor = "nano"

            [storage]
            path = "/tmp/books.json"

            [ai]
            provider = "ollama"

            [ai.ollama]
            model = "mistral"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.editor.as_deref(), Some("nano"));
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/books.json"));
        assert_eq!(config.ai.provider, "ollama");
        assert_eq!(config.ai.ollama.model, "mistral");
        assert_eq!(config.ai.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ai.model, "gpt-3.5-turbo-16k");
    }

    #[test]
    #[serial(autobook_env)]
    fn test_database_path_env_override() {
        let original = std::env::var(DB_PATH_ENV).ok();
        std::env::set_var(DB_PATH_ENV, "/tmp/override.json");

        let mut config = Config::default();
        config.storage.path = Some("/tmp/configured.json".to_string());
        let path = config.database_path().unwrap();

        match original {
            Some(val) => std::env::set_var(DB_PATH_ENV, val),
            None => std::env::remove_var(DB_PATH_ENV),
        }

        assert_eq!(path, PathBuf::from("/tmp/override.json"));
    }

    #[test]
    #[serial(autobook_env)]
    fn test_database_path_from_config() {
        let original = std::env::var(DB_PATH_ENV).ok();
        std::env::remove_var(DB_PATH_ENV);

        let mut config = Config::default();
        config.storage.path = Some("/tmp/configured.json".to_string());
        let path = config.database_path().unwrap();

        if let Some(val) = original {
            std::env::set_var(DB_PATH_ENV, val);
        }

        assert_eq!(path, PathBuf::from("/tmp/configured.json"));
    }

    #[test]
    fn test_editor_from_config_wins() {
        let mut config = Config::default();
        config.general.editor = Some("emacs -nw".to_string());
        assert_eq!(config.editor_command(), "emacs -nw");
    }
}
