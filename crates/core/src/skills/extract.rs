//! # Response Extraction
//!
//! Turns raw model text into a validated artifact.
//!
//! Models often wrap their JSON in markdown fences or a sentence of prose.
//! Rather than deleting fence tokens by substring (which corrupts string
//! values that happen to contain them), the extractor scans for the first
//! balanced `{ ... }` region that parses as a JSON object. Brace depth is
//! tracked outside string literals only, honoring backslash escapes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::agent_definitions::AgentRole;
use super::artifact_registry::{BackendArtifact, CodeArtifact, FrontendArtifact, TaskPlan};
use crate::error::{Result, SwarmError};

type JsonObject = Map<String, Value>;

/// Find the end (exclusive byte offset) of the balanced object opening at `start`
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Locate and parse the first JSON object embedded in `raw`
pub fn locate_json_object(raw: &str) -> Result<JsonObject> {
    let text = raw.trim();
    let malformed = |reason: String| SwarmError::MalformedResponse {
        reason,
        raw: raw.to_string(),
    };

    let mut last_error: Option<String> = None;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find('{') {
        let start = cursor + found;
        let Some(end) = balanced_end(text, start) else {
            // A stray brace in prose; a later candidate may still close
            last_error = Some("unbalanced braces in JSON object".to_string());
            cursor = start + 1;
            continue;
        };

        match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(Value::Object(object)) => return Ok(object),
            Ok(_) => last_error = Some("top-level JSON value is not an object".to_string()),
            Err(e) => last_error = Some(format!("invalid JSON: {}", e)),
        }

        cursor = start + 1;
    }

    Err(malformed(
        last_error.unwrap_or_else(|| "no JSON object found".to_string()),
    ))
}

/// Check every required key of the role, in schema order
pub fn validate(role: AgentRole, object: &JsonObject) -> Result<()> {
    for field in role.schema() {
        let valid = object
            .get(field.key)
            .map(|value| field.kind.matches(value))
            .unwrap_or(false);

        if !valid {
            return Err(SwarmError::SchemaMismatch {
                role,
                key: field.key,
                expected: field.kind.expected(),
            });
        }
    }
    Ok(())
}

/// Locate, validate and deserialize a role response
pub fn extract<T: DeserializeOwned>(role: AgentRole, raw: &str) -> Result<T> {
    let object = locate_json_object(raw)?;
    validate(role, &object)?;
    serde_json::from_value(Value::Object(object)).map_err(|e| SwarmError::MalformedResponse {
        reason: format!("{} response did not deserialize: {}", role, e),
        raw: raw.to_string(),
    })
}

/// Extract the coordinator's task plan
pub fn extract_plan(raw: &str) -> Result<TaskPlan> {
    extract(AgentRole::Coordinator, raw)
}

/// Extract a code artifact for a frontend or backend response
pub fn extract_code(role: AgentRole, raw: &str) -> Result<CodeArtifact> {
    match role {
        AgentRole::Frontend => extract::<FrontendArtifact>(role, raw).map(CodeArtifact::Frontend),
        AgentRole::Backend => extract::<BackendArtifact>(role, raw).map(CodeArtifact::Backend),
        AgentRole::Coordinator => Err(SwarmError::Configuration(
            "the coordinator produces a task plan, not code".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{"frontend_tasks": ["Create a TaskList component"], "backend_tasks": ["Create POST /tasks endpoint"]}"#;

    fn expected_plan() -> TaskPlan {
        TaskPlan {
            frontend_tasks: vec!["Create a TaskList component".to_string()],
            backend_tasks: vec!["Create POST /tasks endpoint".to_string()],
        }
    }

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_plan(PLAN).unwrap(), expected_plan());
    }

    #[test]
    fn test_fenced_json() {
        let raw = format!("```json\n{}\n```", PLAN);
        assert_eq!(extract_plan(&raw).unwrap(), expected_plan());

        let raw = format!("  ```\n{}\n```  \n", PLAN);
        assert_eq!(extract_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn test_mismatched_fences() {
        let opening_only = format!("```json\n{}", PLAN);
        assert_eq!(extract_plan(&opening_only).unwrap(), expected_plan());

        let closing_only = format!("{}\n```", PLAN);
        assert_eq!(extract_plan(&closing_only).unwrap(), expected_plan());
    }

    #[test]
    fn test_prose_around_object() {
        let raw = format!("Sure! Here is the plan:\n{}\nLet me know if {{you}} need more.", PLAN);
        assert_eq!(extract_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn test_fence_text_inside_values_is_preserved() {
        let raw = r#"```json
{"filename": "docs.py", "python_code": "DOC = '''```json\n{}\n```'''"}
```"#;
        let artifact = extract_code(AgentRole::Backend, raw).unwrap();
        match artifact {
            CodeArtifact::Backend(a) => {
                assert_eq!(a.python_code, "DOC = '''```json\n{}\n```'''");
            }
            other => panic!("unexpected artifact: {:?}", other),
        }
    }

    #[test]
    fn test_braces_and_escaped_quotes_in_strings() {
        let raw = r#"{"component_name": "Box", "tsx_code": "const s = \"}\"; if (a) { b(); }", "css_code": ".box { color: red; }"}"#;
        let artifact = extract_code(AgentRole::Frontend, raw).unwrap();
        match artifact {
            CodeArtifact::Frontend(a) => {
                assert_eq!(a.component_name, "Box");
                assert_eq!(a.tsx_code, "const s = \"}\"; if (a) { b(); }");
                assert_eq!(a.css_code, ".box { color: red; }");
            }
            other => panic!("unexpected artifact: {:?}", other),
        }
    }

    #[test]
    fn test_no_object_is_malformed() {
        let err = extract_plan("```json\n```").unwrap_err();
        assert!(matches!(err, SwarmError::MalformedResponse { .. }));
        assert_eq!(err.raw_response(), Some("```json\n```"));

        let err = extract_plan("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, SwarmError::MalformedResponse { .. }));
    }

    #[test]
    fn test_unbalanced_is_malformed() {
        let err = extract_plan(r#"{"frontend_tasks": ["a"], "backend_tasks": ["b"]"#).unwrap_err();
        match err {
            SwarmError::MalformedResponse { reason, .. } => assert!(reason.contains("unbalanced")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_stray_open_brace_before_object() {
        let raw = format!(
            "Note: the component uses a `{{` in JSX.\n```json\n{}\n```",
            PLAN
        );
        assert_eq!(extract_plan(&raw).unwrap(), expected_plan());

        let raw = format!("{}\nand then an unfinished {{ here", PLAN);
        assert_eq!(extract_plan(&raw).unwrap(), expected_plan());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = extract_plan("{frontend_tasks: [a]}").unwrap_err();
        match err {
            SwarmError::MalformedResponse { reason, raw } => {
                assert!(reason.starts_with("invalid JSON"));
                assert_eq!(raw, "{frontend_tasks: [a]}");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_each_missing_key_is_named() {
        let complete = [
            (
                AgentRole::Coordinator,
                serde_json::json!({"frontend_tasks": [], "backend_tasks": []}),
            ),
            (
                AgentRole::Frontend,
                serde_json::json!({"component_name": "A", "tsx_code": "", "css_code": ""}),
            ),
            (
                AgentRole::Backend,
                serde_json::json!({"filename": "a.py", "python_code": ""}),
            ),
        ];

        for (role, value) in complete {
            assert!(validate(role, value.as_object().unwrap()).is_ok());

            for field in role.schema() {
                let mut object = value.as_object().unwrap().clone();
                object.remove(field.key);
                match validate(role, &object) {
                    Err(SwarmError::SchemaMismatch { key, role: r, .. }) => {
                        assert_eq!(key, field.key);
                        assert_eq!(r, role);
                    }
                    other => panic!("expected schema mismatch, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_wrong_type_is_schema_mismatch() {
        let err = extract_plan(r#"{"frontend_tasks": "one task", "backend_tasks": []}"#)
            .unwrap_err();
        match err {
            SwarmError::SchemaMismatch { key, expected, .. } => {
                assert_eq!(key, "frontend_tasks");
                assert_eq!(expected, "array of strings");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err =
            extract_code(AgentRole::Backend, r#"{"filename": 7, "python_code": ""}"#).unwrap_err();
        assert!(matches!(
            err,
            SwarmError::SchemaMismatch { key: "filename", .. }
        ));
    }

    #[test]
    fn test_extra_keys_ignored_and_duplicates_kept() {
        let raw = r#"{"frontend_tasks": ["a", "a", ""], "backend_tasks": [], "notes": "x"}"#;
        let plan = extract_plan(raw).unwrap();
        assert_eq!(plan.frontend_tasks, vec!["a", "a", ""]);
        assert!(plan.backend_tasks.is_empty());
    }

    #[test]
    fn test_coordinator_has_no_code_artifact() {
        assert!(extract_code(AgentRole::Coordinator, PLAN).is_err());
    }
}
