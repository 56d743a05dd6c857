use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AssistantError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gmail: GmailConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    #[serde(default = "default_credentials_path")]
    pub credentials: String,
    #[serde(default = "default_token_cache_path")]
    pub token_cache: String,
    /// Authenticated account; drafts are created in this mailbox.
    #[serde(default)]
    pub user_email: String,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            credentials: default_credentials_path(),
            token_cache: default_token_cache_path(),
            user_email: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_records_dir")]
    pub records_dir: String,
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            records_dir: default_records_dir(),
            drafts_dir: default_drafts_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            fetch_limit: default_fetch_limit(),
        }
    }
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_token_cache_path() -> String {
    ".gmail-assistant/token.json".to_string()
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "deepseek-r1:7b".to_string()
}

fn default_records_dir() -> String {
    "data/emails".to_string()
}

fn default_drafts_dir() -> String {
    "data/drafts".to_string()
}

fn default_fetch_limit() -> usize {
    50
}

impl Config {
    /// Load configuration from a TOML file and validate it. A missing file
    /// is not an error: defaults are used with a warning.
    pub async fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                AssistantError::ConfigError(format!("Failed to read config file: {}", e))
            })?;
            let config: Self = toml::from_str(&content).map_err(|e| {
                AssistantError::ConfigError(format!("Failed to parse config file: {}", e))
            })?;
            tracing::info!("Loaded configuration from {:?}", path);
            config
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration, then apply environment overrides and re-validate.
    /// This is the entry point the binary uses.
    pub async fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("GMAIL_USER_EMAIL") {
            self.gmail.user_email = value;
        }
        if let Ok(value) = std::env::var("GMAIL_CREDENTIALS_PATH") {
            self.gmail.credentials = value;
        }
        if let Ok(value) = std::env::var("GMAIL_TOKEN_PATH") {
            self.gmail.token_cache = value;
        }
        if let Ok(value) = std::env::var("OLLAMA_HOST") {
            self.ollama.host = value;
        }
        if let Ok(value) = std::env::var("OLLAMA_MODEL") {
            self.ollama.model = value;
        }
        if let Ok(value) = std::env::var("EMAIL_FETCH_LIMIT") {
            match value.parse() {
                Ok(limit) => self.processing.fetch_limit = limit,
                Err(_) => tracing::warn!("Ignoring invalid EMAIL_FETCH_LIMIT: {}", value),
            }
        }
        if let Ok(value) = std::env::var("EMAILS_STORAGE_PATH") {
            self.storage.records_dir = value;
        }
        if let Ok(value) = std::env::var("DRAFTS_STORAGE_PATH") {
            self.storage.drafts_dir = value;
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AssistantError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AssistantError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| AssistantError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.processing.fetch_limit == 0 {
            return Err(AssistantError::ConfigError(
                "processing.fetch_limit must be at least 1".to_string(),
            ));
        }
        if self.processing.fetch_limit > 500 {
            return Err(AssistantError::ConfigError(
                "processing.fetch_limit cannot exceed 500 (Gmail list page limit)".to_string(),
            ));
        }

        if !self.ollama.host.starts_with("http://") && !self.ollama.host.starts_with("https://") {
            return Err(AssistantError::ConfigError(format!(
                "ollama.host must be an http(s) URL, got '{}'",
                self.ollama.host
            )));
        }
        if self.ollama.model.is_empty() {
            return Err(AssistantError::ConfigError(
                "ollama.model cannot be empty".to_string(),
            ));
        }

        if self.storage.records_dir.is_empty() {
            return Err(AssistantError::ConfigError(
                "storage.records_dir cannot be empty".to_string(),
            ));
        }
        if self.storage.drafts_dir.is_empty() {
            return Err(AssistantError::ConfigError(
                "storage.drafts_dir cannot be empty".to_string(),
            ));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
