//! # Swarm Coordinator
//!
//! Runs the three-phase pipeline: plan, frontend tasks, backend tasks.
//! Execution is strictly sequential with a fixed pause between tasks.
//! A failed plan aborts the run; a failed task is logged and skipped.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::{Result, SwarmError};
use crate::llm::{GenerationClient, GenerationRequest};
use crate::skills::{extract, prompts, AgentRole, TaskPlan};
use crate::tools::Materializer;

use super::events::{SwarmEvent, SwarmEventKind};
use super::pipeline::{Pipeline, PipelineStage};

/// Configuration for the coordinator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Root of the generated tree
    pub output_dir: PathBuf,
    /// Pause after every frontend/backend task, in milliseconds
    pub task_delay_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            task_delay_ms: 1000,
        }
    }
}

impl CoordinatorConfig {
    pub fn task_delay(&self) -> Duration {
        Duration::from_millis(self.task_delay_ms)
    }
}

/// Result of one frontend or backend task
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub role: AgentRole,
    /// 1-based position within its phase
    pub index: usize,
    pub task: String,
    /// Model-supplied component name or filename, when extraction succeeded
    pub name: Option<String>,
    pub files: Vec<PathBuf>,
    pub error: Option<String>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a full run
#[derive(Debug)]
pub struct SwarmResult {
    /// Plan the coordinator produced
    pub plan: TaskPlan,
    /// One outcome per task, in execution order
    pub outcomes: Vec<TaskOutcome>,
    /// Events that occurred
    pub events: Vec<SwarmEvent>,
    /// Whether every task succeeded
    pub success: bool,
}

impl SwarmResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Every file written during the run
    pub fn files(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .flat_map(|o| o.files.iter().cloned())
            .collect()
    }
}

/// The swarm coordinator
pub struct Coordinator {
    config: CoordinatorConfig,
    client: Arc<dyn GenerationClient>,
    materializer: Materializer,
    pipeline: Pipeline,
    events: Vec<SwarmEvent>,
    event_tx: Option<mpsc::Sender<SwarmEvent>>,
}

impl Coordinator {
    /// Create a new coordinator around an already-configured client
    pub fn new(config: CoordinatorConfig, client: Arc<dyn GenerationClient>) -> Self {
        let materializer = Materializer::new(config.output_dir.clone());
        Self {
            config,
            client,
            materializer,
            pipeline: Pipeline::default(),
            events: Vec::new(),
            event_tx: None,
        }
    }

    /// Set event channel for streaming events
    pub fn with_event_channel(mut self, tx: mpsc::Sender<SwarmEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.pipeline.stage
    }

    /// Emit an event to the log and the channel
    async fn emit(&mut self, event: SwarmEvent) {
        self.events.push(event.clone());
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Build the role prompt and issue one generation call
    async fn generate_raw(&self, role: AgentRole, input: &str) -> Result<String> {
        let prompt = prompts::build_prompt(role, input);
        self.client
            .generate(GenerationRequest::new(role, prompt))
            .await
    }

    /// Plan phase only: decompose the brief into task lists
    pub async fn plan(&mut self, brief: &str) -> Result<TaskPlan> {
        let agent = AgentRole::Coordinator.slug();
        self.emit(SwarmEvent::new(SwarmEventKind::AgentStarted, agent))
            .await;

        let outcome = match self.generate_raw(AgentRole::Coordinator, brief).await {
            Ok(raw) => extract::extract_plan(&raw),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(plan) => {
                tracing::info!(
                    frontend_tasks = plan.frontend_tasks.len(),
                    backend_tasks = plan.backend_tasks.len(),
                    "Plan received and parsed"
                );
                self.emit(
                    SwarmEvent::new(SwarmEventKind::AgentCompleted, agent)
                        .with_data(serde_json::to_value(&plan).unwrap_or_default()),
                )
                .await;
                Ok(plan)
            }
            Err(e) => {
                log_failure(AgentRole::Coordinator, brief, &e);
                self.emit(
                    SwarmEvent::new(SwarmEventKind::AgentFailed, agent)
                        .with_data(failure_data(&e)),
                )
                .await;
                Err(e)
            }
        }
    }

    /// Run the swarm on a project brief
    #[tracing::instrument(skip(self, brief), fields(brief_preview = %brief.trim().chars().take(50).collect::<String>()))]
    pub async fn run(&mut self, brief: &str) -> Result<SwarmResult> {
        self.pipeline = Pipeline::new();
        self.emit(SwarmEvent::new(
            SwarmEventKind::PipelineStarted,
            AgentRole::Coordinator.slug(),
        ))
        .await;

        // Stage 1: the only fatal failure point
        let plan = match self.plan(brief).await {
            Ok(plan) => plan,
            Err(e) => {
                self.pipeline.fail();
                self.emit(
                    SwarmEvent::new(SwarmEventKind::PipelineFailed, AgentRole::Coordinator.slug())
                        .with_data(failure_data(&e)),
                )
                .await;
                return Err(e);
            }
        };
        self.pipeline.advance();

        // Stages 2 and 3
        let mut outcomes = Vec::with_capacity(plan.total_tasks());
        for role in [AgentRole::Frontend, AgentRole::Backend] {
            outcomes.extend(self.run_phase(role, plan.tasks_for(role)).await);
            self.pipeline.advance();
        }

        let success = outcomes.iter().all(TaskOutcome::is_success);
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(tasks = outcomes.len(), failed, "Pipeline finished");

        self.emit(
            SwarmEvent::new(
                SwarmEventKind::PipelineCompleted,
                AgentRole::Coordinator.slug(),
            )
            .with_data(serde_json::json!({
                "tasks": outcomes.len(),
                "failed": failed,
                "output_dir": self.config.output_dir.display().to_string(),
            })),
        )
        .await;

        Ok(SwarmResult {
            plan,
            outcomes,
            events: std::mem::take(&mut self.events),
            success,
        })
    }

    /// Work through one phase's tasks in order, isolating failures
    async fn run_phase(&mut self, role: AgentRole, tasks: &[String]) -> Vec<TaskOutcome> {
        let agent = role.slug();
        if tasks.is_empty() {
            tracing::info!(agent, "No {} tasks found", agent);
            self.emit(SwarmEvent::new(SwarmEventKind::PhaseSkipped, agent))
                .await;
            return Vec::new();
        }

        let total = tasks.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, task) in tasks.iter().enumerate() {
            let index = i + 1;
            self.emit(
                SwarmEvent::new(SwarmEventKind::AgentStarted, agent)
                    .with_task(task)
                    .with_data(serde_json::json!({ "index": index, "total": total })),
            )
            .await;

            let outcome = match self.run_task(role, task).await {
                Ok((name, files)) => {
                    tracing::info!(agent, %name, files = files.len(), "Task materialized");
                    self.emit(
                        SwarmEvent::new(SwarmEventKind::AgentCompleted, agent)
                            .with_task(task)
                            .with_data(serde_json::json!({
                                "index": index,
                                "total": total,
                                "name": name,
                                "files": files
                                    .iter()
                                    .map(|p| p.display().to_string())
                                    .collect::<Vec<_>>(),
                            })),
                    )
                    .await;
                    TaskOutcome {
                        role,
                        index,
                        task: task.clone(),
                        name: Some(name),
                        files,
                        error: None,
                    }
                }
                Err(e) => {
                    log_failure(role, task, &e);
                    self.emit(
                        SwarmEvent::new(SwarmEventKind::AgentFailed, agent)
                            .with_task(task)
                            .with_data(failure_data(&e)),
                    )
                    .await;
                    TaskOutcome {
                        role,
                        index,
                        task: task.clone(),
                        name: None,
                        files: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);

            // Fixed pause regardless of outcome; not adaptive
            if !self.config.task_delay().is_zero() {
                tokio::time::sleep(self.config.task_delay()).await;
            }
        }

        outcomes
    }

    /// Generate, extract and materialize a single task
    async fn run_task(&self, role: AgentRole, task: &str) -> Result<(String, Vec<PathBuf>)> {
        let raw = self.generate_raw(role, task).await?;
        let artifact = extract::extract_code(role, &raw)?;
        let files = self.materializer.materialize(&artifact).await?;
        Ok((artifact.name().to_string(), files))
    }
}

fn log_failure(role: AgentRole, input: &str, error: &SwarmError) {
    tracing::warn!(agent = %role, task = %input.trim(), error = %error, "Agent failed");
    if let Some(raw) = error.raw_response() {
        tracing::warn!(agent = %role, "Raw response was:\n{}", raw);
    }
}

fn failure_data(error: &SwarmError) -> serde_json::Value {
    let mut data = serde_json::json!({
        "error": error.to_string(),
        "error_kind": error.kind(),
    });
    if let Some(raw) = error.raw_response() {
        data["raw_response"] = serde_json::Value::String(raw.to_string());
    }
    data
}
