use crate::llm::BackendError;
use crate::workflow::Stage;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Why the collaborator could not produce text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationErrorKind {
    Timeout,
    Auth,
    MalformedResponse,
    /// Network, provider or configuration failure outside the other kinds
    Transport,
}

impl fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationErrorKind::Timeout => "timeout",
            GenerationErrorKind::Auth => "auth",
            GenerationErrorKind::MalformedResponse => "malformed-response",
            GenerationErrorKind::Transport => "transport",
        };
        f.write_str(s)
    }
}

impl From<&BackendError> for GenerationErrorKind {
    fn from(err: &BackendError) -> Self {
        match err {
            BackendError::TimeoutError { .. } => GenerationErrorKind::Timeout,
            BackendError::AuthenticationError { .. } => GenerationErrorKind::Auth,
            BackendError::InvalidResponse { .. } => GenerationErrorKind::MalformedResponse,
            BackendError::ApiError { .. }
            | BackendError::RateLimitError { .. }
            | BackendError::ConfigurationError { .. }
            | BackendError::NetworkError { .. }
            | BackendError::Other { .. } => GenerationErrorKind::Transport,
        }
    }
}

/// Normalized result of one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Text(String),
    Error {
        kind: GenerationErrorKind,
        detail: String,
    },
}

impl Generation {
    pub fn error(kind: GenerationErrorKind, detail: impl Into<String>) -> Self {
        Generation::Error {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<BackendError> for Generation {
    fn from(err: BackendError) -> Self {
        Generation::Error {
            kind: GenerationErrorKind::from(&err),
            detail: err.to_string(),
        }
    }
}

/// Input handed to the collaborator for one phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseContext {
    pub description: String,
    /// Reports of earlier phases, in phase order
    pub prior_reports: Vec<(Stage, String)>,
    /// Failure reasons from the last validation, set only on a retry
    pub feedback: Option<String>,
    /// 1-based attempt number of this phase
    pub attempt: u32,
}

impl PhaseContext {
    pub fn report(&self, stage: Stage) -> Option<&str> {
        self.prior_reports
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, text)| text.as_str())
    }
}

/// Opaque text-generation collaborator
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, phase: Stage, context: &PhaseContext) -> Generation;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_kinds() {
        let cases = [
            (BackendError::TimeoutError { seconds: 5 }, GenerationErrorKind::Timeout),
            (
                BackendError::AuthenticationError {
                    message: "bad key".to_string(),
                },
                GenerationErrorKind::Auth,
            ),
            (
                BackendError::InvalidResponse {
                    message: "no text".to_string(),
                    raw_response: None,
                },
                GenerationErrorKind::MalformedResponse,
            ),
            (
                BackendError::NetworkError {
                    message: "dns".to_string(),
                },
                GenerationErrorKind::Transport,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(GenerationErrorKind::from(&err), kind);
        }
    }

    #[test]
    fn test_generation_from_backend_error() {
        let generation = Generation::from(BackendError::TimeoutError { seconds: 30 });
        match generation {
            Generation::Error { kind, detail } => {
                assert_eq!(kind, GenerationErrorKind::Timeout);
                assert!(detail.contains("30"));
            }
            Generation::Text(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(GenerationErrorKind::MalformedResponse.to_string(), "malformed-response");
    }

    #[test]
    fn test_context_report_lookup() {
        let context = PhaseContext {
            description: "blog".to_string(),
            prior_reports: vec![(Stage::Requirement, "req".to_string())],
            feedback: None,
            attempt: 1,
        };
        assert_eq!(context.report(Stage::Requirement), Some("req"));
        assert_eq!(context.report(Stage::Design), None);
    }
}
