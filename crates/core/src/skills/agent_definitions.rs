//! # Agent Definitions
//!
//! Each agent is a role: a prompt template plus the set of JSON fields its
//! response must carry. One generic pipeline runs every role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape a required response field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string
    String,
    /// A JSON array whose elements are all strings
    StringList,
}

impl FieldKind {
    /// Human-readable label used in schema errors
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::StringList => "array of strings",
        }
    }

    /// Whether a JSON value has this shape
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::StringList => value
                .as_array()
                .map(|items| items.iter().all(|v| v.is_string()))
                .unwrap_or(false),
        }
    }
}

/// A required key in a role's response object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
}

const fn field(key: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { key, kind }
}

const COORDINATOR_SCHEMA: &[FieldSpec] = &[
    field("frontend_tasks", FieldKind::StringList),
    field("backend_tasks", FieldKind::StringList),
];

const FRONTEND_SCHEMA: &[FieldSpec] = &[
    field("component_name", FieldKind::String),
    field("tsx_code", FieldKind::String),
    field("css_code", FieldKind::String),
];

const BACKEND_SCHEMA: &[FieldSpec] = &[
    field("filename", FieldKind::String),
    field("python_code", FieldKind::String),
];

/// The agents in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Product manager: decomposes a brief into task lists
    Coordinator,
    /// React/TypeScript developer: one component per task
    Frontend,
    /// FastAPI developer: one router module per task
    Backend,
}

impl AgentRole {
    /// All roles in pipeline order
    pub fn all() -> [AgentRole; 3] {
        [AgentRole::Coordinator, AgentRole::Frontend, AgentRole::Backend]
    }

    /// Stable identifier used in events and logs
    pub fn slug(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "coordinator",
            AgentRole::Frontend => "frontend",
            AgentRole::Backend => "backend",
        }
    }

    /// Display name for progress output
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::Coordinator => "Coordinator",
            AgentRole::Frontend => "Frontend",
            AgentRole::Backend => "Backend",
        }
    }

    /// Required response keys, in validation order
    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            AgentRole::Coordinator => COORDINATOR_SCHEMA,
            AgentRole::Frontend => FRONTEND_SCHEMA,
            AgentRole::Backend => BACKEND_SCHEMA,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
