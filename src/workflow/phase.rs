//! Static description of every generation phase

use super::stage::Stage;
use crate::artifact::ArtifactCategory;

/// What the engine does with a phase's report after generating it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    /// Store the report and advance
    Report,
    /// Rebuild artifacts and run the validation gate
    Validate,
    /// Rebuild artifacts, persist, and finish the run
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDescriptor {
    pub stage: Stage,
    /// Reports that must exist before this phase may run
    pub requires: &'static [Stage],
    /// Category that absorbs every code block of this phase's report;
    /// `None` with `feeds_artifacts` means blocks are routed by the classifier
    pub affinity: Option<ArtifactCategory>,
    /// Whether this phase's report contributes artifacts
    pub feeds_artifacts: bool,
    pub step: PhaseStep,
}

pub const PHASES: [PhaseDescriptor; 5] = [
    PhaseDescriptor {
        stage: Stage::Requirement,
        requires: &[],
        affinity: None,
        feeds_artifacts: false,
        step: PhaseStep::Report,
    },
    PhaseDescriptor {
        stage: Stage::Design,
        requires: &[Stage::Requirement],
        affinity: None,
        feeds_artifacts: false,
        step: PhaseStep::Report,
    },
    PhaseDescriptor {
        stage: Stage::Coding,
        requires: &[Stage::Requirement, Stage::Design],
        affinity: None,
        feeds_artifacts: true,
        step: PhaseStep::Report,
    },
    PhaseDescriptor {
        stage: Stage::Testing,
        requires: &[Stage::Coding],
        affinity: Some(ArtifactCategory::Test),
        feeds_artifacts: true,
        step: PhaseStep::Validate,
    },
    PhaseDescriptor {
        stage: Stage::Deployment,
        requires: &[Stage::Coding, Stage::Testing],
        affinity: Some(ArtifactCategory::Deployment),
        feeds_artifacts: true,
        step: PhaseStep::Finalize,
    },
];

pub fn descriptor(stage: Stage) -> Option<&'static PhaseDescriptor> {
    PHASES.iter().find(|d| d.stage == stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptors_follow_stage_order() {
        let stages: Vec<_> = PHASES.iter().map(|d| d.stage).collect();
        assert_eq!(stages, Stage::PHASES.to_vec());
    }

    #[test]
    fn test_requirements_precede_phase() {
        for d in &PHASES {
            for required in d.requires {
                assert!(*required < d.stage, "{} requires later {}", d.stage, required);
            }
        }
    }

    #[test]
    fn test_terminal_stages_have_no_descriptor() {
        assert!(descriptor(Stage::Success).is_none());
        assert!(descriptor(Stage::Failed).is_none());
        assert_eq!(descriptor(Stage::Testing).unwrap().step, PhaseStep::Validate);
    }
}
