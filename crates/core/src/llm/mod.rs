//! # Generation Client
//!
//! The single seam between the swarm and the external model. Every agent
//! role goes through `GenerationClient::generate`; the client performs one
//! request per call and never retries.

pub mod gemini;
pub mod scripted;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::skills::AgentRole;

pub use gemini::GeminiClient;
pub use scripted::ScriptedClient;

/// One prompt for one agent role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub role: AgentRole,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(role: AgentRole, prompt: impl Into<String>) -> Self {
        Self {
            role,
            prompt: prompt.into(),
        }
    }
}

/// Request/response access to a generative model
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Issue exactly one request and return the raw response text
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

#[async_trait]
impl<T: GenerationClient + ?Sized> GenerationClient for Arc<T> {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
}
