//! # Codeswarm Core
//!
//! The "Brain" of codeswarm - agent roles, prompt templates, response
//! extraction, file materialization and pipeline orchestration.
//!
//! ## Architecture
//!
//! - `models` - Model configuration and credential loading
//! - `llm/` - `GenerationClient` seam (Gemini, scripted)
//! - `skills/` - Agent roles, prompts, artifacts and extraction
//! - `tools/` - File materialization
//! - `swarm/` - Pipeline orchestration and events
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codeswarm_core::llm::GeminiClient;
//! use codeswarm_core::models::{Credentials, ModelConfig};
//! use codeswarm_core::swarm::{Coordinator, CoordinatorConfig};
//! use std::sync::Arc;
//!
//! let client = GeminiClient::new(ModelConfig::default(), Credentials::from_env()?)?;
//! let mut coordinator = Coordinator::new(CoordinatorConfig::default(), Arc::new(client));
//! let result = coordinator.run("Build a todo app").await?;
//! ```

pub mod error;
pub mod llm;
pub mod models;
pub mod skills;
pub mod swarm;
pub mod tools;

pub use error::{Result, SwarmError};
