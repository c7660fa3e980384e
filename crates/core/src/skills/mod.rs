//! # Codeswarm Skills
//!
//! Everything role-specific about an agent: what it is asked and what its
//! answer must contain.
//!
//! ## Modules
//!
//! - `agent_definitions` - `AgentRole` and its required response fields
//! - `prompts` - Prompt templates and the prompt builder
//! - `artifact_registry` - Typed artifacts extracted from responses
//! - `extract` - Locating, parsing and validating JSON in raw model text

pub mod agent_definitions;
pub mod artifact_registry;
pub mod extract;
pub mod prompts;

pub use agent_definitions::{AgentRole, FieldKind, FieldSpec};
pub use artifact_registry::{BackendArtifact, CodeArtifact, FrontendArtifact, TaskPlan};
