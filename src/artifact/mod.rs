//! Artifact assembly and persistence

mod backend;
mod category;
mod defaults;
mod deployment;
mod frontend;
mod model;
mod store;
mod writer;

pub use backend::{detect_framework, BackendFramework, DependencyFile, BACKEND_FRAMEWORKS};
pub use category::ArtifactCategory;
pub use defaults::default_artifacts;
pub use frontend::{MARKUP_FILE, SCRIPT_FILE, STYLE_FILE};
pub use model::{Artifact, ArtifactSet, CategorizedText, Fragment};
pub use store::{test_filename, ArtifactStore};
pub use writer::{
    generate_run_id, ArtifactWriter, Manifest, PersistError, PersistedRun, RunRecord,
    MANIFEST_FILE, README_FILE,
};
