//! # Pipeline Stages
//!
//! Defines the stages of the generation pipeline.

use serde::{Deserialize, Serialize};

/// Stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Coordinator decomposing the brief
    Planning,
    /// Frontend agent working through its tasks
    FrontendGeneration,
    /// Backend agent working through its tasks
    BackendGeneration,
    /// Complete
    Complete,
    /// Failed (only reachable from planning)
    Failed,
}

/// The pipeline state machine
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Current stage
    pub stage: PipelineStage,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Planning,
        }
    }
}

impl Pipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next stage
    pub fn advance(&mut self) {
        self.stage = match self.stage {
            PipelineStage::Planning => PipelineStage::FrontendGeneration,
            PipelineStage::FrontendGeneration => PipelineStage::BackendGeneration,
            PipelineStage::BackendGeneration => PipelineStage::Complete,
            PipelineStage::Complete => PipelineStage::Complete,
            PipelineStage::Failed => PipelineStage::Failed,
        };
    }

    /// Fail the pipeline
    pub fn fail(&mut self) {
        self.stage = PipelineStage::Failed;
    }
}
