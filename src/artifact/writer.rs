//! Persists a run's artifacts, reports and manifest under an isolated directory

use super::model::ArtifactSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const README_FILE: &str = "README.md";
pub const REPORTS_DIR: &str = "reports";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Refusing to write outside the run directory: {0}")]
    InvalidPath(String),
}

/// `demo_{YYYYmmdd_HHMMSS}_{8 hex}`, unique across concurrent runs
pub fn generate_run_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("demo_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
}

/// Everything the writer needs to know about a finished run
#[derive(Debug, Clone)]
pub struct RunRecord<'a> {
    pub run_id: &'a str,
    pub description: &'a str,
    pub created_at: DateTime<Utc>,
    pub status: &'a str,
    pub errors: Vec<String>,
    /// Phase name and report text, in phase order
    pub reports: Vec<(&'a str, &'a str)>,
    pub artifacts: &'a ArtifactSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub errors: Vec<String>,
    /// Every written path relative to the run directory, sorted
    pub files: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PersistedRun {
    pub dir: PathBuf,
    pub manifest: Manifest,
}

/// Writes runs below `root/{run_id}/`
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(run_id)
    }

    /// Replaces any earlier output of the same run id; sibling runs are untouched
    pub fn persist(&self, run: &RunRecord<'_>) -> Result<PersistedRun, PersistError> {
        check_relative(run.run_id)?;
        let dir = self.run_dir(run.run_id);

        if dir.exists() {
            debug!(dir = %dir.display(), "Removing previous output of this run");
            fs::remove_dir_all(&dir).map_err(|source| PersistError::Io {
                path: dir.clone(),
                source,
            })?;
        }

        let mut files = Vec::new();

        for artifact in run.artifacts.iter() {
            write_file(&dir, &artifact.path, &artifact.content)?;
            files.push(artifact.path.clone());
        }

        for (phase, report) in &run.reports {
            let path = format!("{}/{}_report.md", REPORTS_DIR, phase);
            write_file(&dir, &path, report)?;
            files.push(path);
        }

        write_file(&dir, README_FILE, &render_readme(run))?;
        files.push(README_FILE.to_string());
        files.sort();

        let manifest = Manifest {
            run_id: run.run_id.to_string(),
            description: run.description.to_string(),
            created_at: run.created_at,
            status: run.status.to_string(),
            errors: run.errors.clone(),
            files,
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        write_file(&dir, MANIFEST_FILE, &json)?;

        info!(
            run_id = run.run_id,
            dir = %dir.display(),
            files = manifest.files.len(),
            "Persisted run"
        );

        Ok(PersistedRun { dir, manifest })
    }
}

fn check_relative(path: &str) -> Result<(), PersistError> {
    let ok = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(PersistError::InvalidPath(path.to_string()))
    }
}

fn write_file(dir: &Path, relative: &str, content: &str) -> Result<(), PersistError> {
    check_relative(relative)?;
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PersistError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, content).map_err(|source| PersistError::Io { path, source })
}

fn render_readme(run: &RunRecord<'_>) -> String {
    let title = run
        .description
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("Generated demo")
        .trim();

    let mut out = format!("# {}\n\n", title);
    out.push_str(&format!(
        "Run `{}` created {} ({}).\n\n",
        run.run_id,
        run.created_at.to_rfc3339(),
        run.status
    ));

    if let Some((_, overview)) = run.reports.iter().find(|(phase, _)| *phase == "requirement") {
        out.push_str("## Overview\n\n");
        out.push_str(overview.trim());
        out.push_str("\n\n");
    }

    out.push_str("## Files\n\n");
    for path in run.artifacts.paths() {
        out.push_str(&format!("- `{}`\n", path));
    }
    out.push('\n');

    if let Some((_, notes)) = run.reports.iter().find(|(phase, _)| *phase == "deployment") {
        out.push_str("## Deployment\n\n");
        out.push_str(notes.trim());
        out.push('\n');
    }

    if !run.errors.is_empty() {
        out.push_str("\n## Errors\n\n");
        for error in &run.errors {
            out.push_str(&format!("- {}\n", error));
        }
    }

    out
}
