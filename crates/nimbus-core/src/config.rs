use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{NimbusError, Result};

/// Top-level configuration for the Nimbus service.
///
/// Loaded from `~/.nimbus/config.toml` by default. Each section corresponds
/// to a bounded concern: HTTP serving and the Gemini backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NimbusConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Default for NimbusConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl NimbusConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NimbusConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NimbusError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Maximum request body size in bytes (file payloads arrive base64-encoded).
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Gemini backend settings.
///
/// Generation defaults match the upstream service-wide defaults; individual
/// operations may override temperature per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key. When absent, the `GOOGLE_API_KEY` environment variable is used.
    pub api_key: Option<String>,
    /// Base URL of the generative language API.
    pub base_url: String,
    /// Model served for `flash` requests.
    pub flash_model: String,
    /// Model served for `pro` requests (multimodal-capable).
    pub pro_model: String,
    /// Embedding model.
    pub embedding_model: String,
    /// Request timeout in seconds for one backend call.
    pub timeout_secs: u64,
    /// Default sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Maximum tokens generated per reply.
    pub max_output_tokens: u32,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            flash_model: "gemini-1.5-flash-latest".to_string(),
            pro_model: "gemini-1.5-pro-latest".to_string(),
            embedding_model: "embedding-001".to_string(),
            timeout_secs: 60,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            retry: RetryConfig::default(),
        }
    }
}

impl GeminiConfig {
    /// Resolve the API key: explicit config value, else `GOOGLE_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.trim().is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("GOOGLE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Retry policy for transient backend failures.
///
/// `max_attempts = 1` means a single attempt, no retry. Backoff is linear:
/// the n-th retry waits `n * backoff_ms` milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per backend call, including the first.
    pub max_attempts: u32,
    /// Base backoff between attempts in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 500,
        }
    }
}
