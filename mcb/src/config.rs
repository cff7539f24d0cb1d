//! Micro-challenge bot configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transcript::Bootstrap;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Conversation texts and exit handling
    pub session: SessionConfig,

    /// Terminal presentation
    pub ui: UiConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .microchallenge.yml
        let local_config = PathBuf::from(".microchallenge.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/microchallenge/microchallenge.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("microchallenge").join("microchallenge.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "gemini" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// YAML file of secrets, consulted when the environment variable is unset
    #[serde(rename = "secrets-file")]
    pub secrets_file: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            secrets_file: "~/.config/microchallenge/secrets.yml".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.4,
            max_tokens: 500,
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Secrets file path with `~/` expanded
    pub fn secrets_path(&self) -> Option<PathBuf> {
        match self.secrets_file.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(&self.secrets_file)),
        }
    }

    /// Resolve the API key: environment variable first, then the secrets file
    ///
    /// Consulted once at startup. A missing key is an error naming the
    /// variable so the caller can stop before any interaction.
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            tracing::debug!(env = %self.api_key_env, "get_api_key: found in environment");
            return Ok(key.trim().to_string());
        }

        if let Some(path) = self.secrets_path()
            && path.exists()
        {
            let content = fs::read_to_string(&path)
                .context(format!("Failed to read secrets file {}", path.display()))?;
            let secrets: HashMap<String, String> = serde_yaml::from_str(&content)
                .context(format!("Failed to parse secrets file {}", path.display()))?;
            if let Some(key) = secrets.get(&self.api_key_env).filter(|k| !k.trim().is_empty()) {
                tracing::debug!(path = %path.display(), "get_api_key: found in secrets file");
                return Ok(key.trim().to_string());
            }
        }

        Err(eyre::eyre!(
            "{} not found. Set the {} environment variable or add it to {}.",
            self.api_key_env,
            self.api_key_env,
            self.secrets_file
        ))
    }
}

/// Conversation texts and exit handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Opening instruction sent as the first user turn
    #[serde(rename = "bootstrap-instruction")]
    pub bootstrap_instruction: String,

    /// Opening model reply
    #[serde(rename = "bootstrap-ack")]
    pub bootstrap_ack: String,

    /// Input that ends the session, matched case-insensitively
    #[serde(rename = "exit-token")]
    pub exit_token: String,

    /// Model turn appended when the session ends
    pub farewell: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bootstrap_instruction: "You are the Daily Challenge Giver. Give one 'micro-challenge' that can be done \
                                    today (for example: 'Learn 5 new words', 'Smile at 3 strangers'). Refuse any \
                                    request other than a 'challenge'."
                .to_string(),
            bootstrap_ack: "Ready for today's challenge? Type 'challenge' to get your micro-challenge!".to_string(),
            exit_token: "exit".to_string(),
            farewell: "See you later!".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn bootstrap(&self) -> Bootstrap {
        Bootstrap {
            instruction: self.bootstrap_instruction.clone(),
            acknowledgment: self.bootstrap_ack.clone(),
        }
    }
}

/// Terminal presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,

    pub tagline: String,

    /// Hint shown above the input prompt
    #[serde(rename = "input-hint")]
    pub input_hint: String,

    /// Shown while waiting for the model
    #[serde(rename = "thinking-message")]
    pub thinking_message: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "🤖 Micro-Challenge Chatbot".to_string(),
            tagline: "Get a small daily challenge to make your day more productive!".to_string(),
            input_hint: "Type 'challenge' or 'exit'...".to_string(),
            thinking_message: "Chatbot is thinking...".to_string(),
        }
    }
}
