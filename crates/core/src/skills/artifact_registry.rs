//! # Artifact Registry
//!
//! Typed records extracted from agent responses. Each one is produced only
//! after its role schema has been validated, so every field is present.

use serde::{Deserialize, Serialize};

use super::agent_definitions::AgentRole;

// ============================================================================
// Coordinator
// ============================================================================

/// Decomposition of a brief into task lists, in model order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub frontend_tasks: Vec<String>,
    pub backend_tasks: Vec<String>,
}

impl TaskPlan {
    /// Tasks for a code-producing role
    pub fn tasks_for(&self, role: AgentRole) -> &[String] {
        match role {
            AgentRole::Frontend => &self.frontend_tasks,
            AgentRole::Backend => &self.backend_tasks,
            AgentRole::Coordinator => &[],
        }
    }

    pub fn total_tasks(&self) -> usize {
        self.frontend_tasks.len() + self.backend_tasks.len()
    }
}

// ============================================================================
// Code Artifacts
// ============================================================================

/// A single React component plus its CSS Module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendArtifact {
    pub component_name: String,
    pub tsx_code: String,
    pub css_code: String,
}

/// A single backend source file at a model-chosen relative path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendArtifact {
    pub filename: String,
    pub python_code: String,
}

/// Output of a code-producing agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum CodeArtifact {
    Frontend(FrontendArtifact),
    Backend(BackendArtifact),
}

impl CodeArtifact {
    /// Model-supplied name used for progress output
    pub fn name(&self) -> &str {
        match self {
            CodeArtifact::Frontend(a) => &a.component_name,
            CodeArtifact::Backend(a) => &a.filename,
        }
    }
}
