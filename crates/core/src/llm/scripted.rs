//! Scripted client for tests and offline runs.
//!
//! Responses come from a closure over the request, so a test can answer per
//! role, fail a specific task, or count calls afterwards.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{GenerationClient, GenerationRequest};
use crate::error::{Result, SwarmError};
use crate::skills::AgentRole;

type Responder = dyn Fn(&GenerationRequest) -> Result<String> + Send + Sync;

pub struct ScriptedClient {
    responder: Box<Responder>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fixed response per role
    pub fn by_role(
        coordinator: impl Into<String>,
        frontend: impl Into<String>,
        backend: impl Into<String>,
    ) -> Self {
        let (coordinator, frontend, backend) = (coordinator.into(), frontend.into(), backend.into());
        Self::new(move |request| {
            Ok(match request.role {
                AgentRole::Coordinator => coordinator.clone(),
                AgentRole::Frontend => frontend.clone(),
                AgentRole::Backend => backend.clone(),
            })
        })
    }

    /// Every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| Err(SwarmError::Generation(message.clone())))
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self, role: AgentRole) -> usize {
        self.calls().iter().filter(|c| c.role == role).count()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let response = (self.responder)(&request);
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        response
    }
}
