//! Human-readable progress lines rendered from swarm events.

use codeswarm_core::skills::AgentRole;
use codeswarm_core::swarm::{SwarmEvent, SwarmEventKind};
use std::collections::HashSet;

/// Tracks which phase headers have been printed
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    headers: HashSet<String>,
}

fn role_of(agent: &str) -> Option<AgentRole> {
    AgentRole::all().into_iter().find(|r| r.slug() == agent)
}

fn header(role: AgentRole) -> String {
    match role {
        AgentRole::Coordinator => {
            "\n--- [1/3] Running Coordinator Agent to get the project plan ---".to_string()
        }
        AgentRole::Frontend => "\n--- [2/3] Running Frontend Agent for each task ---".to_string(),
        AgentRole::Backend => "\n--- [3/3] Running Backend Agent for each task ---".to_string(),
    }
}

/// Line for a failed plan phase, worded by error kind
pub fn plan_failure_line(kind: &str, error: &str) -> String {
    let what = match kind {
        "malformed_response" | "schema_mismatch" => "Failed to parse the project plan.",
        "generation" => "The coordinator request failed.",
        _ => "Could not produce a project plan.",
    };
    format!("❌ Error: {} Cannot proceed. {}", what, error)
}

fn data_str<'a>(event: &'a SwarmEvent, key: &str) -> Option<&'a str> {
    event.data.as_ref()?.get(key)?.as_str()
}

fn data_u64(event: &SwarmEvent, key: &str) -> Option<u64> {
    event.data.as_ref()?.get(key)?.as_u64()
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for one event
    pub fn render(&mut self, event: &SwarmEvent) -> Vec<String> {
        let mut lines = Vec::new();
        let Some(role) = role_of(&event.agent) else {
            return lines;
        };

        let phase_event = matches!(
            event.kind,
            SwarmEventKind::AgentStarted | SwarmEventKind::PhaseSkipped
        );
        if phase_event && self.headers.insert(event.agent.clone()) {
            lines.push(header(role));
        }

        let task = event.task.as_deref().unwrap_or_default();
        let error = data_str(event, "error").unwrap_or("unknown error");

        match (&event.kind, role) {
            (SwarmEventKind::AgentCompleted, AgentRole::Coordinator) => {
                lines.push("✅ Plan received and parsed successfully.".to_string());
            }
            (SwarmEventKind::AgentFailed, AgentRole::Coordinator) => {
                let kind = data_str(event, "error_kind").unwrap_or_default();
                lines.push(plan_failure_line(kind, error));
            }
            (SwarmEventKind::AgentStarted, AgentRole::Coordinator) => {}
            (SwarmEventKind::AgentStarted, _) => {
                lines.push(format!(
                    "\nProcessing {} Task ({}/{}): {}",
                    role.display_name(),
                    data_u64(event, "index").unwrap_or(0),
                    data_u64(event, "total").unwrap_or(0),
                    task
                ));
            }
            (SwarmEventKind::AgentCompleted, _) => {
                let name = data_str(event, "name").unwrap_or(task);
                lines.push(format!("✅ Code for '{}' saved successfully.", name));
                let files = event
                    .data
                    .as_ref()
                    .and_then(|d| d.get("files"))
                    .and_then(|f| f.as_array());
                for file in files.into_iter().flatten().filter_map(|f| f.as_str()) {
                    lines.push(format!("   - {}", file));
                }
            }
            (SwarmEventKind::AgentFailed, _) => {
                lines.push(format!(
                    "❌ Error processing {} task '{}': {}",
                    role.slug(),
                    task,
                    error
                ));
            }
            (SwarmEventKind::PhaseSkipped, _) => {
                lines.push(format!("No {} tasks found.", role.slug()));
            }
            (SwarmEventKind::PipelineCompleted, _) => {
                let failed = data_u64(event, "failed").unwrap_or(0);
                let output = data_str(event, "output_dir").unwrap_or("output");
                if failed == 0 {
                    lines.push(format!(
                        "\n--- ✅ All tasks complete! Project generated successfully in the '{}' directory. ---",
                        output
                    ));
                } else {
                    lines.push(format!(
                        "\n--- ⚠️ Run finished with {} failed task(s). Output is in the '{}' directory. ---",
                        failed, output
                    ));
                }
            }
            (SwarmEventKind::PipelineStarted, _) | (SwarmEventKind::PipelineFailed, _) => {}
        }

        lines
    }
}
