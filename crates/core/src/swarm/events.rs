//! # Swarm Events
//!
//! Progress events emitted by the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of swarm event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwarmEventKind {
    /// Pipeline started
    PipelineStarted,
    /// Agent started working on a brief or task
    AgentStarted,
    /// Agent completed successfully
    AgentCompleted,
    /// Agent failed (task skipped, or run aborted for the coordinator)
    AgentFailed,
    /// A phase had no tasks
    PhaseSkipped,
    /// Pipeline completed
    PipelineCompleted,
    /// Pipeline failed
    PipelineFailed,
}

/// An event in the swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmEvent {
    /// Unique event ID
    pub id: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Kind of event
    pub kind: SwarmEventKind,
    /// Agent that produced this event
    pub agent: String,
    /// Associated data (JSON)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Task description if applicable
    #[serde(default)]
    pub task: Option<String>,
}

impl SwarmEvent {
    /// Create a new event
    pub fn new(kind: SwarmEventKind, agent: &str) -> Self {
        Self {
            id: event_id(),
            timestamp: Utc::now(),
            kind,
            agent: agent.to_string(),
            data: None,
            task: None,
        }
    }

    /// Add data to the event
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add the task description to the event
    pub fn with_task(mut self, task: &str) -> Self {
        self.task = Some(task.to_string());
        self
    }
}

/// Time-ordered, collision-resistant event id (not a UUID)
fn event_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:x}-{:x}", nanos, SEQ.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = SwarmEvent::new(SwarmEventKind::AgentStarted, "frontend")
            .with_task("Create a TaskList component")
            .with_data(serde_json::json!({"index": 1, "total": 3}));

        assert_eq!(event.agent, "frontend");
        assert_eq!(event.task.as_deref(), Some("Create a TaskList component"));
        assert_eq!(event.data.unwrap()["total"], 3);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = SwarmEvent::new(SwarmEventKind::PipelineStarted, "coordinator");
        let b = SwarmEvent::new(SwarmEventKind::PipelineStarted, "coordinator");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&SwarmEventKind::PhaseSkipped).unwrap();
        assert_eq!(json, "\"phase_skipped\"");
    }
}
