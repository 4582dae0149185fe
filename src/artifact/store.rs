use super::backend::assemble_backend;
use super::category::ArtifactCategory;
use super::defaults::default_artifacts;
use super::deployment::assemble_deployment;
use super::frontend::split_frontend;
use super::model::{Artifact, ArtifactSet, CategorizedText};
use crate::classify::contains_term;
use tracing::debug;

pub const SCHEMA_FILE: &str = "schema.sql";

/// Turns categorized text into a complete, path-keyed file layout
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore;

impl ArtifactStore {
    pub fn new() -> Self {
        Self
    }

    /// Every category ends up with at least one non-empty file; empty
    /// categories are filled from the defaults.
    pub fn assemble(&self, text: &CategorizedText) -> ArtifactSet {
        let mut set = ArtifactSet::new();

        for category in ArtifactCategory::ALL {
            let artifacts = self.assemble_category(category, text);
            if artifacts.iter().any(|a| !a.content.trim().is_empty()) {
                debug!(
                    category = %category,
                    files = artifacts.len(),
                    "Assembled category from generated content"
                );
                set.extend(artifacts);
            } else {
                debug!(category = %category, "Category empty, using defaults");
                set.extend(default_artifacts(category));
            }
        }

        set
    }

    fn assemble_category(&self, category: ArtifactCategory, text: &CategorizedText) -> Vec<Artifact> {
        if text.is_empty(category) {
            return Vec::new();
        }

        match category {
            ArtifactCategory::Frontend => split_frontend(text.fragments(category)),
            ArtifactCategory::Backend => assemble_backend(&text.joined(category)),
            ArtifactCategory::Database => {
                vec![Artifact::new(category, SCHEMA_FILE, text.joined(category))]
            }
            ArtifactCategory::Test => {
                let joined = text.joined(category);
                let filename = test_filename(&joined);
                vec![Artifact::new(category, filename, joined)]
            }
            ArtifactCategory::Deployment => assemble_deployment(text.fragments(category)),
        }
    }
}

/// Test file name implied by the framework the suite uses
pub fn test_filename(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if contains_term(&lower, "unittest") {
        "test_unittest.py"
    } else if contains_term(&lower, "pytest") {
        "test_pytest.py"
    } else if contains_term(&lower, "jest") || contains_term(&lower, "describe(") {
        "app.test.js"
    } else {
        "test_app.py"
    }
}
