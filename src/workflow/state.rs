use super::config::WorkflowConfig;
use super::stage::Stage;
use crate::artifact::{generate_run_id, ArtifactCategory, ArtifactSet};
use crate::generation::GenerationErrorKind;
use crate::validation::ValidationReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Entries of the append-only error log
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowError {
    /// Collaborator failure; terminal, never retried
    #[error("{phase} generation failed ({kind}): {detail}")]
    Generation {
        phase: Stage,
        kind: GenerationErrorKind,
        detail: String,
    },

    /// Recoverable; sends the run back to `coding`
    #[error("Validation failed on attempt {attempt}: {}", .reasons.join("; "))]
    ValidationFailure { attempt: u32, reasons: Vec<String> },

    #[error("Workflow exhausted after {attempts} coding attempts")]
    Exhausted { attempts: u32 },

    #[error("Failed to persist run: {detail}")]
    Persistence { detail: String },

    #[error("{phase} cannot run without the {missing} report")]
    Precondition { phase: Stage, missing: Stage },
}

impl WorkflowError {
    /// True for entries that end the run
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowError::ValidationFailure { .. })
    }
}

/// Everything a run has produced; exclusively owned by the engine while running
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    pub run_id: String,
    pub description: String,
    #[serde(skip)]
    pub config: WorkflowConfig,
    pub created_at: DateTime<Utc>,
    pub stage: Stage,
    /// Raw report text per phase
    pub reports: BTreeMap<Stage, String>,
    /// Concatenated classified text per category
    pub artifacts: BTreeMap<ArtifactCategory, String>,
    /// Assembled file layout
    pub files: ArtifactSet,
    pub errors: Vec<WorkflowError>,
    /// Attempts per phase; only `coding` is ever retried
    pub retries: BTreeMap<Stage, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl WorkflowState {
    pub fn new(description: impl Into<String>, config: WorkflowConfig) -> Self {
        let created_at = Utc::now();
        Self {
            run_id: generate_run_id(created_at),
            description: description.into(),
            config,
            created_at,
            stage: Stage::Requirement,
            reports: BTreeMap::new(),
            artifacts: BTreeMap::new(),
            files: ArtifactSet::new(),
            errors: Vec::new(),
            retries: BTreeMap::new(),
            last_validation: None,
            output_dir: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.stage == Stage::Success
    }

    pub fn is_failed(&self) -> bool {
        self.stage == Stage::Failed
    }

    pub fn retry_count(&self, stage: Stage) -> u32 {
        self.retries.get(&stage).copied().unwrap_or(0)
    }

    pub fn report(&self, stage: Stage) -> Option<&str> {
        self.reports.get(&stage).map(String::as_str)
    }

    /// Reports in phase order
    pub fn reports_in_order(&self) -> Vec<(Stage, String)> {
        self.reports
            .iter()
            .map(|(stage, text)| (*stage, text.clone()))
            .collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, WorkflowError::Exhausted { .. }))
    }

    pub fn summary(&self) -> String {
        format!(
            "run {} {} with {} files, {} reports, {} errors",
            self.run_id,
            self.stage,
            self.files.len(),
            self.reports.len(),
            self.errors.len()
        )
    }
}
