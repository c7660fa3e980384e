//! # Codeswarm Models
//!
//! Generative-model configuration and credential loading.
//!
//! The API key is read once from the environment and handed to the client
//! constructor; nothing here touches process-wide state.
//!
//! ## Example
//! ```rust,ignore
//! use codeswarm_core::models::{Credentials, ModelConfig};
//!
//! let credentials = Credentials::from_env()?;
//! let config = ModelConfig::new("gemini-pro-latest");
//! let client = GeminiClient::new(config, credentials)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwarmError};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-pro-latest";

/// Default Gemini REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the generation model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model name (e.g., "gemini-pro-latest", "gemini-1.5-flash")
    pub model: String,
    /// Base endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 120,
        }
    }
}

impl ModelConfig {
    /// Create a config for a specific model with default endpoint
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the endpoint (for proxies or local emulators)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Model name without a leading `models/` prefix
    pub fn model_id(&self) -> &str {
        self.model.strip_prefix("models/").unwrap_or(&self.model)
    }
}

/// API credentials for the generation service
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Wrap an explicit key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Load the key from `GEMINI_API_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the key through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(API_KEY_ENV) {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(SwarmError::Configuration(format!(
                "{} not found. Please check your .env file.",
                API_KEY_ENV
            ))),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
