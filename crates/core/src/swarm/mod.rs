//! # Swarm Orchestration
//!
//! Coordinates the agent pipeline.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Brief → Coordinator → [Frontend task]* → [Backend task]* → files on disk
//! ```

pub mod coordinator;
pub mod events;
pub mod pipeline;

pub use coordinator::{Coordinator, CoordinatorConfig, SwarmResult, TaskOutcome};
pub use events::{SwarmEvent, SwarmEventKind};
pub use pipeline::{Pipeline, PipelineStage};
