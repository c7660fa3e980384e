//! # Swarm Errors
//!
//! Error taxonomy for the generation-and-extraction pipeline.
//! The coordinator decides which of these are fatal (plan phase) and which
//! are isolated to a single task (frontend/backend phases).

use std::path::PathBuf;
use thiserror::Error;

use crate::skills::AgentRole;

/// Errors produced anywhere between prompt and file
#[derive(Debug, Error)]
pub enum SwarmError {
    /// Missing or invalid credential / configuration
    #[error("{0}")]
    Configuration(String),

    /// The upstream model call failed (network, auth, quota, service fault)
    #[error("generation failed: {0}")]
    Generation(String),

    /// No JSON object could be recovered from the model output
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// A required key was missing or had the wrong type
    #[error("{role} response missing or invalid key '{key}' (expected {expected})")]
    SchemaMismatch {
        role: AgentRole,
        key: &'static str,
        expected: &'static str,
    },

    /// A model-supplied name is empty, absolute, or would resolve outside the output tree
    #[error("refusing to write '{name}': not a relative path inside the output directory")]
    PathEscape { name: String },

    /// Filesystem failure while materializing an artifact
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SwarmError {
    /// Stable snake_case name of the variant, carried in events
    pub fn kind(&self) -> &'static str {
        match self {
            SwarmError::Configuration(_) => "configuration",
            SwarmError::Generation(_) => "generation",
            SwarmError::MalformedResponse { .. } => "malformed_response",
            SwarmError::SchemaMismatch { .. } => "schema_mismatch",
            SwarmError::PathEscape { .. } => "path_escape",
            SwarmError::Write { .. } => "write",
        }
    }

    /// Raw model text attached to the error, if any
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            SwarmError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias for swarm operations
pub type Result<T> = std::result::Result<T, SwarmError>;
