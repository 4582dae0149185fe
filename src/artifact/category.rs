use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of artifact categories a run produces
///
/// Declaration order is the classifier's priority order and also the order in
/// which categories are laid out on disk and in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactCategory {
    Frontend,
    Backend,
    Database,
    Test,
    Deployment,
}

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 5] = [
        ArtifactCategory::Frontend,
        ArtifactCategory::Backend,
        ArtifactCategory::Database,
        ArtifactCategory::Test,
        ArtifactCategory::Deployment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactCategory::Frontend => "frontend",
            ArtifactCategory::Backend => "backend",
            ArtifactCategory::Database => "database",
            ArtifactCategory::Test => "test",
            ArtifactCategory::Deployment => "deployment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "frontend" => Some(ArtifactCategory::Frontend),
            "backend" => Some(ArtifactCategory::Backend),
            "database" | "db" => Some(ArtifactCategory::Database),
            "test" | "tests" => Some(ArtifactCategory::Test),
            "deployment" | "deploy" => Some(ArtifactCategory::Deployment),
            _ => None,
        }
    }

    /// Directory under the run root that holds this category's files
    pub fn dir(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
