//! Persisted configuration (`.codeswarm/config.json`) and its layering.
//!
//! Precedence, lowest first: built-in defaults, the config file, CLI flags.
//! The API key never lives here; it comes from the environment or `.env`.

use anyhow::{Context, Result};
use codeswarm_core::models::ModelConfig;
use codeswarm_core::swarm::CoordinatorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "CODESWARM_CONFIG";

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = ".codeswarm/config.json";

/// Partial configuration; unset fields fall through to the next layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_delay_ms: Option<u64>,
}

impl PersistedConfig {
    /// Config file path: `$CODESWARM_CONFIG` or the default
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load from disk; a missing file is an empty layer
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Overlay every field that `other` sets
    pub fn merge(&mut self, other: PersistedConfig) {
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
        if other.task_delay_ms.is_some() {
            self.task_delay_ms = other.task_delay_ms;
        }
    }

    /// Every field filled from the built-in defaults
    pub fn defaults() -> Self {
        let model = ModelConfig::default();
        let coordinator = CoordinatorConfig::default();
        Self {
            model: Some(model.model),
            endpoint: Some(model.endpoint),
            timeout_secs: Some(model.timeout_secs),
            output_dir: Some(coordinator.output_dir),
            task_delay_ms: Some(coordinator.task_delay_ms),
        }
    }

    /// Split into the core configuration types
    pub fn resolve(self) -> (ModelConfig, CoordinatorConfig) {
        let defaults = ModelConfig::default();
        let model = ModelConfig::new(self.model.unwrap_or(defaults.model))
            .with_endpoint(self.endpoint.unwrap_or(defaults.endpoint))
            .with_timeout_secs(self.timeout_secs.unwrap_or(defaults.timeout_secs));

        let mut coordinator = CoordinatorConfig::default();
        if let Some(dir) = self.output_dir {
            coordinator.output_dir = dir;
        }
        if let Some(ms) = self.task_delay_ms {
            coordinator.task_delay_ms = ms;
        }

        (model, coordinator)
    }
}
