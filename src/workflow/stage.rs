//! Workflow states and the pure transition function

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Requirement,
    Design,
    Coding,
    Testing,
    Deployment,
    Success,
    Failed,
}

impl Stage {
    /// Generation phases in execution order
    pub const PHASES: [Stage; 5] = [
        Stage::Requirement,
        Stage::Design,
        Stage::Coding,
        Stage::Testing,
        Stage::Deployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Requirement => "requirement",
            Stage::Design => "design",
            Stage::Coding => "coding",
            Stage::Testing => "testing",
            Stage::Deployment => "deployment",
            Stage::Success => "success",
            Stage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Success | Stage::Failed)
    }

    /// The phase that follows in the fixed order, ignoring branches
    pub fn successor(&self) -> Stage {
        match self {
            Stage::Requirement => Stage::Design,
            Stage::Design => Stage::Coding,
            Stage::Coding => Stage::Testing,
            Stage::Testing => Stage::Deployment,
            Stage::Deployment => Stage::Success,
            Stage::Success => Stage::Success,
            Stage::Failed => Stage::Failed,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened while a phase ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Report generated (and, for deployment, persisted)
    Completed,
    /// The collaborator failed; never retried
    GenerationFailed,
    ValidationPassed,
    /// `attempts` is the coding retry counter after this failure
    ValidationFailed { attempts: u32, max_attempts: u32 },
    PersistFailed,
    /// A required earlier report is missing
    Aborted,
}

/// Pure transition function of the workflow state machine.
///
/// Terminal stages absorb every outcome. Combinations that cannot occur in a
/// well-formed run route to `Failed` rather than looping.
pub fn next(stage: Stage, outcome: PhaseOutcome) -> Stage {
    use PhaseOutcome::*;

    if stage.is_terminal() {
        return stage;
    }

    match (stage, outcome) {
        (_, GenerationFailed) | (_, PersistFailed) | (_, Aborted) => Stage::Failed,
        (Stage::Testing, ValidationPassed) => Stage::Deployment,
        (Stage::Testing, ValidationFailed { attempts, max_attempts }) => {
            if attempts < max_attempts {
                Stage::Coding
            } else {
                Stage::Failed
            }
        }
        (Stage::Testing, Completed) => Stage::Failed,
        (stage, Completed) => stage.successor(),
        _ => Stage::Failed,
    }
}
