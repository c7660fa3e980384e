//! # File Materializer
//!
//! Writes extracted artifacts under the output root.
//!
//! ```text
//! <root>/backend/<filename>
//! <root>/frontend/components/<Name>/<Name>.tsx
//! <root>/frontend/components/<Name>/<Name>.module.css
//! ```
//!
//! Names come from the model, so they are confined: a backend filename must
//! be a relative path of normal segments, a component name a single segment.
//! Existing files are overwritten in place. Files of a multi-file artifact
//! are written one after another; a failure on the second leaves the first.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{Result, SwarmError};
use crate::skills::{BackendArtifact, CodeArtifact, FrontendArtifact};

/// A resolved destination and the text to put there
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    /// Directory the file must stay inside
    pub base: PathBuf,
    pub path: PathBuf,
    pub content: String,
}

/// Validate a model-supplied relative path, dropping `.` segments
fn confine_relative(name: &str) -> Result<PathBuf> {
    let escape = || SwarmError::PathEscape {
        name: name.to_string(),
    };

    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(escape())
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(escape());
    }
    Ok(relative)
}

/// Validate a name that must be exactly one path segment
fn single_segment(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None) if segment == name => Ok(name),
        _ => Err(SwarmError::PathEscape {
            name: name.to_string(),
        }),
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> SwarmError + '_ {
    move |source| SwarmError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes artifacts below a fixed output root
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Base directory for backend files
    pub fn backend_dir(&self) -> PathBuf {
        self.root.join("backend")
    }

    /// Parent of every component directory
    pub fn components_dir(&self) -> PathBuf {
        self.root.join("frontend").join("components")
    }

    /// Resolve every file an artifact produces without touching the disk
    pub fn resolve(&self, artifact: &CodeArtifact) -> Result<Vec<OutputFile>> {
        match artifact {
            CodeArtifact::Backend(a) => self.resolve_backend(a),
            CodeArtifact::Frontend(a) => self.resolve_frontend(a),
        }
    }

    fn resolve_backend(&self, artifact: &BackendArtifact) -> Result<Vec<OutputFile>> {
        let base = self.backend_dir();
        let path = base.join(confine_relative(&artifact.filename)?);
        Ok(vec![OutputFile {
            base,
            path,
            content: artifact.python_code.clone(),
        }])
    }

    fn resolve_frontend(&self, artifact: &FrontendArtifact) -> Result<Vec<OutputFile>> {
        let name = single_segment(&artifact.component_name)?;
        let base = self.components_dir();
        let dir = base.join(name);
        Ok(vec![
            OutputFile {
                path: dir.join(format!("{}.tsx", name)),
                base: base.clone(),
                content: artifact.tsx_code.clone(),
            },
            OutputFile {
                path: dir.join(format!("{}.module.css", name)),
                base,
                content: artifact.css_code.clone(),
            },
        ])
    }

    /// Write every file of an artifact, returning the written paths
    pub async fn materialize(&self, artifact: &CodeArtifact) -> Result<Vec<PathBuf>> {
        let files = self.resolve(artifact)?;
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            write_confined(&file).await?;
            written.push(file.path);
        }
        Ok(written)
    }
}

/// Canonical form of `path`, where only a prefix needs to exist.
/// Missing trailing components are appended unchanged.
async fn resolve_existing(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match fs::canonicalize(existing).await {
            Ok(mut real) => {
                real.extend(missing.iter().rev());
                return Ok(real);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = if parent.as_os_str().is_empty() {
                            Path::new(".")
                        } else {
                            parent
                        };
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

fn escape(file: &OutputFile) -> SwarmError {
    SwarmError::PathEscape {
        name: file.path.display().to_string(),
    }
}

/// Check confinement on the real filesystem, create missing parents, write
async fn write_confined(file: &OutputFile) -> Result<()> {
    let parent = file.path.parent().unwrap_or(&file.base);

    // Symlinked directories inside the tree could point elsewhere; nothing
    // is created until the existing part of the path is known to stay inside
    let real_base = resolve_existing(&file.base)
        .await
        .map_err(write_error(&file.base))?;
    let planned_parent = resolve_existing(parent)
        .await
        .map_err(write_error(parent))?;
    if !planned_parent.starts_with(&real_base) {
        return Err(escape(file));
    }

    fs::create_dir_all(parent)
        .await
        .map_err(write_error(parent))?;

    let real_parent = fs::canonicalize(parent)
        .await
        .map_err(write_error(parent))?;
    let target_is_link = fs::symlink_metadata(&file.path)
        .await
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !real_parent.starts_with(&real_base) || target_is_link {
        return Err(escape(file));
    }

    fs::write(&file.path, &file.content)
        .await
        .map_err(write_error(&file.path))?;

    tracing::debug!(path = %file.path.display(), bytes = file.content.len(), "File written");
    Ok(())
}
