use super::config::WorkflowConfig;
use super::phase::{descriptor, PhaseDescriptor, PhaseStep, PHASES};
use super::stage::{next, PhaseOutcome, Stage};
use super::state::{WorkflowError, WorkflowState};
use crate::artifact::{ArtifactStore, ArtifactWriter, CategorizedText, PersistError, RunRecord};
use crate::classify::ContentClassifier;
use crate::generation::{Generation, GenerationErrorKind, GenerationPort, PhaseContext};
use crate::progress::{EventStatus, NoOpHandler, ProgressHandler, WorkflowEvent};
use crate::validation::Validator;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Phase name used for run-level events
pub const RUN_EVENT_PHASE: &str = "workflow";

/// Drives one description through every phase to `success` or `failed`
pub struct WorkflowEngine {
    port: Arc<dyn GenerationPort>,
    classifier: ContentClassifier,
    store: ArtifactStore,
    validator: Validator,
    progress: Arc<dyn ProgressHandler>,
    config: WorkflowConfig,
}

impl WorkflowEngine {
    pub fn new(port: Arc<dyn GenerationPort>, config: WorkflowConfig) -> Self {
        Self {
            port,
            classifier: ContentClassifier::new(),
            store: ArtifactStore::new(),
            validator: Validator::new(),
            progress: Arc::new(NoOpHandler),
            config,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_classifier(mut self, classifier: ContentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub async fn run(&self, description: &str) -> WorkflowState {
        self.run_with_config(description, self.config.clone()).await
    }

    /// Runs every phase in order. Never returns early: the final state carries
    /// all reports, artifacts and errors produced, whether it succeeded or not.
    pub async fn run_with_config(&self, description: &str, config: WorkflowConfig) -> WorkflowState {
        let start = Instant::now();
        let mut state = WorkflowState::new(description, config);
        let mut feedback: Option<String> = None;

        info!(
            run_id = %state.run_id,
            generator = self.port.name(),
            max_retries = state.config.max_retries,
            "Starting workflow"
        );

        while !state.stage.is_terminal() {
            let stage = state.stage;
            let outcome = match descriptor(stage) {
                Some(phase) => self.run_phase(phase, &mut state, &mut feedback).await,
                None => PhaseOutcome::Aborted,
            };
            state.stage = next(stage, outcome);
            debug!(from = %stage, to = %state.stage, ?outcome, "Transition");
        }

        if state.is_failed() && !self.persistence_failed(&state) {
            if let Err(e) = self.persist(&mut state) {
                warn!(run_id = %state.run_id, error = %e, "Failed to persist failed run");
                state.errors.push(WorkflowError::Persistence {
                    detail: e.to_string(),
                });
            }
        }

        let status = if state.is_success() {
            EventStatus::Succeeded
        } else {
            EventStatus::Failed
        };
        self.emit(RUN_EVENT_PHASE, status, state.summary());
        info!(
            run_id = %state.run_id,
            stage = %state.stage,
            errors = state.errors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Workflow finished"
        );

        state
    }

    async fn run_phase(
        &self,
        phase: &PhaseDescriptor,
        state: &mut WorkflowState,
        feedback: &mut Option<String>,
    ) -> PhaseOutcome {
        let stage = phase.stage;

        if let Some(missing) = phase
            .requires
            .iter()
            .copied()
            .find(|required| !state.reports.contains_key(required))
        {
            let error = WorkflowError::Precondition {
                phase: stage,
                missing,
            };
            self.emit(stage.as_str(), EventStatus::Failed, error.to_string());
            state.errors.push(error);
            return PhaseOutcome::Aborted;
        }

        let attempt = state.retry_count(stage) + 1;
        self.emit(stage.as_str(), EventStatus::Started, format!("attempt {}", attempt));
        let phase_start = Instant::now();

        let context = PhaseContext {
            description: state.description.clone(),
            prior_reports: state
                .reports_in_order()
                .into_iter()
                .filter(|(s, _)| *s < stage)
                .collect(),
            feedback: if stage == Stage::Coding {
                feedback.take()
            } else {
                None
            },
            attempt,
        };

        let report = match self.generate(stage, &context, state).await {
            Generation::Text(text) => text,
            Generation::Error { kind, detail } => {
                let error = WorkflowError::Generation {
                    phase: stage,
                    kind,
                    detail,
                };
                warn!(phase = %stage, attempt, error = %error, "Generation failed");
                self.emit(stage.as_str(), EventStatus::Failed, error.to_string());
                state.errors.push(error);
                return PhaseOutcome::GenerationFailed;
            }
        };
        state.reports.insert(stage, report);

        if phase.feeds_artifacts {
            self.rebuild_artifacts(state, stage);
        }

        let outcome = match phase.step {
            PhaseStep::Report => {
                self.emit(stage.as_str(), EventStatus::Completed, "");
                PhaseOutcome::Completed
            }
            PhaseStep::Validate => self.validate(state, feedback),
            PhaseStep::Finalize => match self.persist(state) {
                Ok(()) => {
                    let message = match &state.output_dir {
                        Some(dir) => format!("persisted to {}", dir.display()),
                        None => String::new(),
                    };
                    self.emit(stage.as_str(), EventStatus::Completed, message);
                    PhaseOutcome::Completed
                }
                Err(e) => {
                    let error = WorkflowError::Persistence {
                        detail: e.to_string(),
                    };
                    self.emit(stage.as_str(), EventStatus::Failed, error.to_string());
                    state.errors.push(error);
                    PhaseOutcome::PersistFailed
                }
            },
        };

        info!(
            phase = %stage,
            attempt,
            duration_ms = phase_start.elapsed().as_millis() as u64,
            "Phase finished"
        );
        outcome
    }

    async fn generate(
        &self,
        stage: Stage,
        context: &PhaseContext,
        state: &WorkflowState,
    ) -> Generation {
        match state.config.generation_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.port.generate(stage, context)).await {
                    Ok(generation) => generation,
                    Err(_) => Generation::error(
                        GenerationErrorKind::Timeout,
                        format!("no response within {}s", limit.as_secs_f64()),
                    ),
                }
            }
            None => self.port.generate(stage, context).await,
        }
    }

    /// Re-derives artifacts from every code-bearing report up to `upto`
    fn rebuild_artifacts(&self, state: &mut WorkflowState, upto: Stage) {
        let mut text = CategorizedText::new();

        for phase in PHASES
            .iter()
            .filter(|p| p.feeds_artifacts && p.stage <= upto)
        {
            let Some(report) = state.reports.get(&phase.stage) else {
                continue;
            };
            let blocks = self.classifier.extract(report);
            match phase.affinity {
                Some(category) => text.absorb_blocks(category, &blocks),
                None => text.route_blocks(&blocks),
            }
        }

        state.artifacts = text.to_text_map();
        state.files = self.store.assemble(&text);
        debug!(
            upto = %upto,
            categories = state.artifacts.len(),
            files = state.files.len(),
            "Artifacts rebuilt"
        );
    }

    fn validate(&self, state: &mut WorkflowState, feedback: &mut Option<String>) -> PhaseOutcome {
        let report = self.validator.validate(&state.files);
        let passed = report.passed();
        let summary = report.summary();
        let reasons = report.reasons.clone();
        state.last_validation = Some(report);

        if passed {
            self.emit(Stage::Testing.as_str(), EventStatus::Completed, "validation passed");
            return PhaseOutcome::ValidationPassed;
        }

        let attempts = state.retries.entry(Stage::Coding).or_insert(0);
        *attempts += 1;
        let attempts = *attempts;
        let max_attempts = state.config.max_retries;

        warn!(attempt = attempts, max_attempts, reasons = %summary, "Validation failed");
        state
            .errors
            .push(WorkflowError::ValidationFailure { attempt: attempts, reasons });

        if attempts < max_attempts {
            *feedback = Some(summary.clone());
            self.emit(
                Stage::Testing.as_str(),
                EventStatus::Retrying,
                format!("attempt {} of {}: {}", attempts, max_attempts, summary),
            );
        } else {
            let error = WorkflowError::Exhausted { attempts };
            self.emit(Stage::Testing.as_str(), EventStatus::Failed, error.to_string());
            state.errors.push(error);
        }

        PhaseOutcome::ValidationFailed {
            attempts,
            max_attempts,
        }
    }

    /// Writes the run when an output root is configured; status follows the stage
    fn persist(&self, state: &mut WorkflowState) -> Result<(), PersistError> {
        let Some(root) = &state.config.output_root else {
            return Ok(());
        };

        let status = if state.is_failed() { "failed" } else { "success" };
        let errors: Vec<String> = state.errors.iter().map(|e| e.to_string()).collect();
        let reports: Vec<(&str, &str)> = state
            .reports
            .iter()
            .map(|(stage, text)| (stage.as_str(), text.as_str()))
            .collect();

        let persisted = ArtifactWriter::new(root).persist(&RunRecord {
            run_id: &state.run_id,
            description: &state.description,
            created_at: state.created_at,
            status,
            errors,
            reports,
            artifacts: &state.files,
        })?;

        state.output_dir = Some(persisted.dir);
        Ok(())
    }

    fn persistence_failed(&self, state: &WorkflowState) -> bool {
        state
            .errors
            .iter()
            .any(|e| matches!(e, WorkflowError::Persistence { .. }))
    }

    fn emit(&self, phase: &str, status: EventStatus, message: impl Into<String>) {
        self.progress
            .on_event(&WorkflowEvent::new(phase, status, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactCategory, ArtifactSet};
    use crate::validation::ValidationRule;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays scripted generations and records every context it was given
    struct ScriptedPort {
        script: Mutex<VecDeque<Generation>>,
        calls: Mutex<Vec<(Stage, PhaseContext)>>,
    }

    impl ScriptedPort {
        fn new(script: Vec<Generation>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn texts(texts: &[&str]) -> Arc<Self> {
            Self::new(texts.iter().map(|t| Generation::Text(t.to_string())).collect())
        }

        fn calls(&self) -> Vec<(Stage, PhaseContext)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationPort for ScriptedPort {
        async fn generate(&self, phase: Stage, context: &PhaseContext) -> Generation {
            self.calls.lock().unwrap().push((phase, context.clone()));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Generation::Text(String::new()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct SlowPort;

    #[async_trait]
    impl GenerationPort for SlowPort {
        async fn generate(&self, _phase: Stage, _context: &PhaseContext) -> Generation {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Generation::Text(String::new())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct AlwaysFails;

    impl ValidationRule for AlwaysFails {
        fn name(&self) -> &'static str {
            "AlwaysFails"
        }

        fn validate(&self, _artifacts: &ArtifactSet) -> anyhow::Result<()> {
            anyhow::bail!("rejected")
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<WorkflowEvent>>);

    impl ProgressHandler for Recorder {
        fn on_event(&self, event: &WorkflowEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_empty_reports_reach_success_with_defaults() {
        let port = ScriptedPort::texts(&["", "", "", "", ""]);
        let engine = WorkflowEngine::new(port.clone(), WorkflowConfig::default());

        let state = engine.run("A todo app").await;

        assert_eq!(state.stage, Stage::Success);
        assert!(state.errors.is_empty());
        for category in ArtifactCategory::ALL {
            assert!(state.files.has_category(category));
        }
        let stages: Vec<_> = port.calls().into_iter().map(|(s, _)| s).collect();
        assert_eq!(stages, Stage::PHASES.to_vec());
    }

    #[tokio::test]
    async fn test_always_failing_gate_exhausts_after_three_coding_attempts() {
        let port = ScriptedPort::texts(&[]);
        let engine = WorkflowEngine::new(port.clone(), WorkflowConfig::default())
            .with_validator(Validator::with_rules(vec![Box::new(AlwaysFails)]));

        let state = engine.run("A todo app").await;

        assert_eq!(state.stage, Stage::Failed);
        assert!(state.is_exhausted());
        assert_eq!(state.retry_count(Stage::Coding), 3);

        let coding_calls: Vec<_> = port
            .calls()
            .into_iter()
            .filter(|(s, _)| *s == Stage::Coding)
            .collect();
        assert_eq!(coding_calls.len(), 3);
        assert_eq!(port.calls().len(), 8);
        assert_eq!(coding_calls[0].1.feedback, None);
        assert_eq!(
            coding_calls[1].1.feedback.as_deref(),
            Some("[AlwaysFails] rejected")
        );
        assert_eq!(coding_calls[2].1.attempt, 3);

        let failures = state
            .errors
            .iter()
            .filter(|e| matches!(e, WorkflowError::ValidationFailure { .. }))
            .count();
        assert_eq!(failures, 3);
        assert!(matches!(
            state.errors.last(),
            Some(WorkflowError::Exhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_custom_retry_bound() {
        let port = ScriptedPort::texts(&[]);
        let engine = WorkflowEngine::new(port.clone(), WorkflowConfig::new().with_max_retries(1))
            .with_validator(Validator::with_rules(vec![Box::new(AlwaysFails)]));

        let state = engine.run("x").await;

        assert!(state.is_exhausted());
        assert_eq!(port.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_generation_error_is_terminal_and_keeps_partial_results() {
        let port = ScriptedPort::new(vec![
            Generation::Text("Users want recipes.".to_string()),
            Generation::Text("Flask plus SQLite.".to_string()),
            Generation::error(GenerationErrorKind::Auth, "bad key"),
        ]);
        let engine = WorkflowEngine::new(port.clone(), WorkflowConfig::default());

        let state = engine.run("Recipes").await;

        assert_eq!(state.stage, Stage::Failed);
        assert_eq!(port.calls().len(), 3);
        assert_eq!(state.report(Stage::Requirement), Some("Users want recipes."));
        assert_eq!(state.report(Stage::Design), Some("Flask plus SQLite."));
        assert_eq!(
            state.errors,
            vec![WorkflowError::Generation {
                phase: Stage::Coding,
                kind: GenerationErrorKind::Auth,
                detail: "bad key".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_deployment_generation_error_is_terminal() {
        let port = ScriptedPort::new(vec![
            Generation::Text(String::new()),
            Generation::Text(String::new()),
            Generation::Text(String::new()),
            Generation::Text(String::new()),
            Generation::error(GenerationErrorKind::Timeout, "slow"),
        ]);
        let state = WorkflowEngine::new(port, WorkflowConfig::default())
            .run("x")
            .await;

        assert_eq!(state.stage, Stage::Failed);
        assert!(!state.files.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_context_carries_prior_reports() {
        let port = ScriptedPort::texts(&["REQ", "DESIGN", "", "", ""]);
        WorkflowEngine::new(port.clone(), WorkflowConfig::default())
            .run("A blog")
            .await;

        let calls = port.calls();
        let (_, coding) = &calls[2];
        assert_eq!(coding.description, "A blog");
        assert_eq!(
            coding.prior_reports,
            vec![
                (Stage::Requirement, "REQ".to_string()),
                (Stage::Design, "DESIGN".to_string()),
            ]
        );
        assert!(calls[0].1.prior_reports.is_empty());
    }

    #[tokio::test]
    async fn test_artifacts_follow_classification_and_affinity() {
        let coding = "```python\nfrom flask import Flask\napp = Flask(__name__)\n```\n\
                      ```html\n<!DOCTYPE html>\n<html><head></head><body></body></html>\n```";
        let testing = "```python\nimport pytest\n\ndef test_home():\n    assert True\n```";
        let deployment = "```dockerfile\nFROM python:3.11\n```";
        let port = ScriptedPort::texts(&["", "", coding, testing, deployment]);

        let state = WorkflowEngine::new(port, WorkflowConfig::default())
            .run("x")
            .await;

        assert!(state.is_success(), "{:?}", state.errors);
        assert!(state
            .files
            .get("backend/app.py")
            .unwrap()
            .content
            .contains("from flask import Flask"));
        assert!(state.files.get("backend/requirements.txt").is_some());
        assert!(state.files.get("test/test_pytest.py").is_some());
        assert_eq!(
            state.files.get("deployment/Dockerfile").unwrap().content,
            "FROM python:3.11"
        );
        assert!(state.artifacts[&ArtifactCategory::Test].contains("def test_home"));
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let engine = WorkflowEngine::new(
            Arc::new(SlowPort),
            WorkflowConfig::new().with_generation_timeout(Duration::from_millis(20)),
        );

        let state = engine.run("x").await;

        assert_eq!(state.stage, Stage::Failed);
        assert!(matches!(
            &state.errors[0],
            WorkflowError::Generation {
                phase: Stage::Requirement,
                kind: GenerationErrorKind::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_event_stream_order() {
        let recorder = Arc::new(Recorder::default());
        let port = ScriptedPort::texts(&["", "", "", "", ""]);
        WorkflowEngine::new(port, WorkflowConfig::default())
            .with_progress(recorder.clone())
            .run("x")
            .await;

        let events = recorder.0.lock().unwrap().clone();
        let first: Vec<_> = events
            .iter()
            .take(2)
            .map(|e| (e.phase.as_str(), e.status))
            .collect();
        assert_eq!(
            first,
            vec![
                ("requirement", EventStatus::Started),
                ("requirement", EventStatus::Completed),
            ]
        );
        let last = events.last().unwrap();
        assert_eq!(last.phase, RUN_EVENT_PHASE);
        assert_eq!(last.status, EventStatus::Succeeded);
        assert_eq!(events.len(), 11);
    }

    #[tokio::test]
    async fn test_retry_emits_retrying_event() {
        let recorder = Arc::new(Recorder::default());
        let engine = WorkflowEngine::new(
            ScriptedPort::texts(&[]),
            WorkflowConfig::new().with_max_retries(2),
        )
        .with_validator(Validator::with_rules(vec![Box::new(AlwaysFails)]))
        .with_progress(recorder.clone());

        engine.run("x").await;

        let statuses: Vec<_> = recorder
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.phase == "testing")
            .map(|e| e.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                EventStatus::Started,
                EventStatus::Retrying,
                EventStatus::Started,
                EventStatus::Failed,
            ]
        );
    }

    #[tokio::test]
    async fn test_persists_successful_run() {
        let tmp = tempfile::TempDir::new().unwrap();
        let engine = WorkflowEngine::new(
            ScriptedPort::texts(&["REQ", "", "", "", "Deploy with docker."]),
            WorkflowConfig::new().with_output_root(tmp.path()),
        );

        let state = engine.run("A todo app").await;

        assert!(state.is_success());
        let dir = state.output_dir.clone().unwrap();
        assert_eq!(dir, tmp.path().join(&state.run_id));
        assert!(dir.join("manifest.json").exists());
        assert!(dir.join("frontend/index.html").exists());
        assert!(dir.join("reports/requirement_report.md").exists());
    }

    #[tokio::test]
    async fn test_persists_failed_run_with_failed_status() {
        let tmp = tempfile::TempDir::new().unwrap();
        let engine = WorkflowEngine::new(
            ScriptedPort::new(vec![Generation::error(GenerationErrorKind::Auth, "no key")]),
            WorkflowConfig::new().with_output_root(tmp.path()),
        );

        let state = engine.run("x").await;

        let manifest = std::fs::read_to_string(state.output_dir.unwrap().join("manifest.json")).unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["status"], "failed");
        assert_eq!(manifest["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_fails_run() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let engine = WorkflowEngine::new(
            ScriptedPort::texts(&["", "", "", "", ""]),
            WorkflowConfig::new().with_output_root(&blocker),
        );

        let state = engine.run("x").await;

        assert_eq!(state.stage, Stage::Failed);
        assert_eq!(
            state
                .errors
                .iter()
                .filter(|e| matches!(e, WorkflowError::Persistence { .. }))
                .count(),
            1
        );
    }
}
