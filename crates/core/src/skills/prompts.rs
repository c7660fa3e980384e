//! Prompt templates bundled at compile time.
//!
//! Each template carries a single `{{input}}` placeholder that receives the
//! brief or task description verbatim. The input is not escaped or
//! validated; a brief that itself contains JSON or separator lines goes to
//! the model as-is.

use super::agent_definitions::AgentRole;

/// Placeholder replaced by the role input
pub const INPUT_PLACEHOLDER: &str = "{{input}}";

/// Coordinator - decomposes a brief into frontend/backend tasks
pub const COORDINATOR: &str = include_str!("defaults/coordinator.md");

/// Frontend - one React/TypeScript component per task
pub const FRONTEND: &str = include_str!("defaults/frontend.md");

/// Backend - one FastAPI router module per task
pub const BACKEND: &str = include_str!("defaults/backend.md");

/// Template for a role
pub fn template(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Coordinator => COORDINATOR,
        AgentRole::Frontend => FRONTEND,
        AgentRole::Backend => BACKEND,
    }
}

/// Build the full prompt for a role
pub fn build_prompt(role: AgentRole, input: &str) -> String {
    let template = template(role);
    match template.split_once(INPUT_PLACEHOLDER) {
        Some((head, tail)) => {
            let mut prompt = String::with_capacity(template.len() + input.len());
            prompt.push_str(head);
            prompt.push_str(input);
            prompt.push_str(tail);
            prompt
        }
        None => format!("{}\n---\n{}\n---\n", template, input),
    }
}

/// All templates with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    AgentRole::all()
        .into_iter()
        .map(|role| (role.slug(), template(role)))
        .collect()
}
