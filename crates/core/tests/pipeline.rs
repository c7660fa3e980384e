//! End-to-end runs of the coordinator against a scripted model.

use codeswarm_core::llm::{GenerationRequest, ScriptedClient};
use codeswarm_core::skills::AgentRole;
use codeswarm_core::swarm::{Coordinator, CoordinatorConfig, PipelineStage, SwarmEventKind};
use codeswarm_core::SwarmError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn config(root: &Path) -> CoordinatorConfig {
    CoordinatorConfig {
        output_dir: root.join("output"),
        task_delay_ms: 0,
    }
}

/// All files below `root`, relative and sorted
fn tree(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

/// Pull the task text back out of a role prompt
fn task_of(request: &GenerationRequest) -> String {
    request
        .prompt
        .split("---\n")
        .nth(1)
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[tokio::test]
async fn todo_app_produces_exactly_three_files() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::by_role(
        r#"{"frontend_tasks": ["Create a TaskList component"], "backend_tasks": ["Create POST /tasks endpoint"]}"#,
        "```json\n{\"component_name\": \"TaskList\", \"tsx_code\": \"export default function TaskList() { return null; }\", \"css_code\": \".list {}\"}\n```",
        r#"{"filename": "tasks.py", "python_code": "from fastapi import APIRouter\n"}"#,
    ));

    let mut coordinator = Coordinator::new(config(tmp.path()), client.clone());
    let result = coordinator.run("Build a todo app").await.unwrap();

    assert!(result.success);
    assert_eq!(result.succeeded(), 2);
    assert_eq!(
        tree(&tmp.path().join("output")),
        vec![
            PathBuf::from("backend/tasks.py"),
            PathBuf::from("frontend/components/TaskList/TaskList.module.css"),
            PathBuf::from("frontend/components/TaskList/TaskList.tsx"),
        ]
    );
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("output/backend/tasks.py")).unwrap(),
        "from fastapi import APIRouter\n"
    );

    let roles: Vec<_> = client.calls().iter().map(|c| c.role).collect();
    assert_eq!(
        roles,
        vec![AgentRole::Coordinator, AgentRole::Frontend, AgentRole::Backend]
    );
    assert_eq!(task_of(&client.calls()[1]), "Create a TaskList component");
    assert_eq!(task_of(&client.calls()[2]), "Create POST /tasks endpoint");
}

#[tokio::test]
async fn failing_task_does_not_stop_its_phase() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::new(|request| match request.role {
        AgentRole::Coordinator => Ok(
            r#"{"frontend_tasks": ["Alpha", "Beta", "Gamma"], "backend_tasks": []}"#.to_string(),
        ),
        AgentRole::Frontend => {
            let task = task_of(request);
            if task == "Beta" {
                return Err(SwarmError::Generation("503 Service Unavailable".to_string()));
            }
            Ok(format!(
                r#"{{"component_name": "{}", "tsx_code": "tsx", "css_code": "css"}}"#,
                task
            ))
        }
        AgentRole::Backend => Ok(String::new()),
    }));

    let mut coordinator = Coordinator::new(config(tmp.path()), client.clone());
    let result = coordinator.run("brief").await.unwrap();

    assert_eq!(client.call_count(AgentRole::Frontend), 3);
    assert!(!result.success);
    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.failed(), 1);

    let failed = result.outcomes.iter().find(|o| !o.is_success()).unwrap();
    assert_eq!(failed.task, "Beta");
    assert_eq!(failed.index, 2);
    assert!(failed.error.as_deref().unwrap().contains("503"));

    let components = tmp.path().join("output/frontend/components");
    assert!(components.join("Alpha/Alpha.tsx").exists());
    assert!(!components.join("Beta").exists());
    assert!(components.join("Gamma/Gamma.module.css").exists());
    assert_eq!(result.files().len(), 4);

    let failures = result
        .events
        .iter()
        .filter(|e| e.kind == SwarmEventKind::AgentFailed)
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test]
async fn malformed_plan_issues_no_task_calls() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::by_role(
        "Sorry, I can't produce a plan for that.",
        r#"{"component_name": "X", "tsx_code": "", "css_code": ""}"#,
        r#"{"filename": "x.py", "python_code": ""}"#,
    ));

    let mut coordinator = Coordinator::new(config(tmp.path()), client.clone());
    let err = coordinator.run("brief").await.unwrap_err();

    assert!(matches!(err, SwarmError::MalformedResponse { .. }));
    assert_eq!(client.calls().len(), 1);
    assert_eq!(client.call_count(AgentRole::Frontend), 0);
    assert_eq!(client.call_count(AgentRole::Backend), 0);
    assert!(!tmp.path().join("output").exists());
}

#[tokio::test]
async fn generation_error_in_plan_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::failing("API key not valid"));

    let mut coordinator = Coordinator::new(config(tmp.path()), client.clone());
    let err = coordinator.run("brief").await.unwrap_err();

    assert!(matches!(err, SwarmError::Generation(_)));
    assert_eq!(client.calls().len(), 1);
    assert_eq!(coordinator.stage(), PipelineStage::Failed);
}

#[tokio::test]
async fn schema_mismatch_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::by_role(
        r#"{"frontend_tasks": ["Card"], "backend_tasks": ["Router"]}"#,
        r#"{"component_name": "Card", "tsx_code": "tsx"}"#,
        r#"{"python_code": "print(1)"}"#,
    ));

    let mut coordinator = Coordinator::new(config(tmp.path()), client.clone());
    let result = coordinator.run("brief").await.unwrap();

    assert_eq!(result.failed(), 2);
    let errors: Vec<_> = result
        .outcomes
        .iter()
        .map(|o| o.error.clone().unwrap())
        .collect();
    assert!(errors[0].contains("'css_code'"));
    assert!(errors[1].contains("'filename'"));
    assert!(tree(tmp.path()).is_empty());
}

#[tokio::test]
async fn escaping_filename_is_rejected_and_run_continues() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::new(|request| match request.role {
        AgentRole::Coordinator => Ok(
            r#"{"frontend_tasks": [], "backend_tasks": ["evil", "good"]}"#.to_string(),
        ),
        AgentRole::Backend if task_of(request) == "evil" => {
            Ok(r#"{"filename": "../../pwned.py", "python_code": "x"}"#.to_string())
        }
        _ => Ok(r#"{"filename": "routers/tasks.py", "python_code": "y"}"#.to_string()),
    }));

    let mut coordinator = Coordinator::new(config(tmp.path()), client.clone());
    let result = coordinator.run("brief").await.unwrap();

    assert_eq!(result.succeeded(), 1);
    assert_eq!(
        tree(tmp.path()),
        vec![PathBuf::from("output/backend/routers/tasks.py")]
    );
}

#[tokio::test]
async fn rerun_overwrites_with_identical_content() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::by_role(
        r#"{"frontend_tasks": ["TaskItem"], "backend_tasks": ["tasks"]}"#,
        r#"{"component_name": "TaskItem", "tsx_code": "a", "css_code": "b"}"#,
        r#"{"filename": "tasks.py", "python_code": "c"}"#,
    ));

    let mut first = Coordinator::new(config(tmp.path()), client.clone());
    first.run("brief").await.unwrap();
    let snapshot: Vec<Vec<u8>> = tree(tmp.path())
        .iter()
        .map(|p| std::fs::read(tmp.path().join(p)).unwrap())
        .collect();

    let mut second = Coordinator::new(config(tmp.path()), client.clone());
    second.run("brief").await.unwrap();
    let again: Vec<Vec<u8>> = tree(tmp.path())
        .iter()
        .map(|p| std::fs::read(tmp.path().join(p)).unwrap())
        .collect();

    assert_eq!(snapshot, again);
    assert_eq!(snapshot.len(), 3);
}

#[tokio::test]
async fn events_stream_through_channel() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::by_role(
        r#"{"frontend_tasks": ["A"], "backend_tasks": []}"#,
        r#"{"component_name": "A", "tsx_code": "", "css_code": ""}"#,
        "",
    ));
    let (tx, mut rx) = tokio::sync::mpsc::channel(64);

    let mut coordinator = Coordinator::new(config(tmp.path()), client).with_event_channel(tx);
    let result = coordinator.run("brief").await.unwrap();
    drop(coordinator);

    let mut kinds = Vec::new();
    while let Some(event) = rx.recv().await {
        kinds.push(event.kind);
    }

    assert_eq!(
        kinds,
        vec![
            SwarmEventKind::PipelineStarted,
            SwarmEventKind::AgentStarted,
            SwarmEventKind::AgentCompleted,
            SwarmEventKind::AgentStarted,
            SwarmEventKind::AgentCompleted,
            SwarmEventKind::PhaseSkipped,
            SwarmEventKind::PipelineCompleted,
        ]
    );
    assert_eq!(result.events.len(), kinds.len());
}
