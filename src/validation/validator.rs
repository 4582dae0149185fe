use crate::artifact::ArtifactSet;
use crate::validation::rules::{
    MarkupStructureRule, NonEmptyAssetsRule, RequiredCategoriesRule, ValidationRule,
};
use serde::Serialize;
use tracing::debug;

/// Outcome of one gate run; `reasons` is empty iff the gate passed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub reasons: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Reasons joined one per line, as fed back into the retry prompt
    pub fn summary(&self) -> String {
        self.reasons.join("\n")
    }
}

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Runs every rule; failures are collected rather than short-circuited
    pub fn validate(&self, artifacts: &ArtifactSet) -> ValidationReport {
        let reasons: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.validate(artifacts)
                    .err()
                    .map(|e| format!("[{}] {}", rule.name(), e))
            })
            .collect();

        debug!(
            rules = self.rules.len(),
            failures = reasons.len(),
            "Validation finished"
        );
        ValidationReport { reasons }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredCategoriesRule),
                Box::new(MarkupStructureRule),
                Box::new(NonEmptyAssetsRule),
            ],
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("Validator").field("rules", &names).finish()
    }
}
