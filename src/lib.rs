//! demoforge - staged LLM workflow that turns a description into a runnable demo
//!
//! A [`WorkflowEngine`] walks a fixed sequence of phases (requirement, design,
//! coding, testing, deployment). Each phase asks a [`GenerationPort`] for a
//! report; code blocks in the reports are recovered by the
//! [`ContentClassifier`], laid out as files by the [`ArtifactStore`] and checked
//! by the [`Validator`] before anything is written to disk. A failed check sends
//! the run back to coding with the failure reasons, up to a retry bound.
//!
//! # Example Usage
//!
//! ```ignore
//! use demoforge::{DemoforgeConfig, LlmGenerationPort, WorkflowEngine};
//! use std::sync::Arc;
//!
//! async fn generate() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DemoforgeConfig::default();
//!     let client = config.create_client().await?;
//!     let port = Arc::new(LlmGenerationPort::new(client));
//!
//!     let state = WorkflowEngine::new(port, config.workflow_config())
//!         .run("A todo list with a REST API")
//!         .await;
//!
//!     println!("{}", state.summary());
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`workflow`]: stages, transition function and the engine
//! - [`classify`]: code block extraction and categorization
//! - [`artifact`]: file layout, defaults and persistence
//! - [`validation`]: rules gating persistence
//! - [`generation`]: the generation port, prompts and transcript
//! - [`llm`]: provider clients behind [`LLMClient`]
//! - [`progress`]: workflow event handlers

pub mod artifact;
pub mod classify;
pub mod cli;
pub mod config;
pub mod generation;
pub mod llm;
pub mod progress;
pub mod util;
pub mod validation;
pub mod workflow;

pub use artifact::{Artifact, ArtifactCategory, ArtifactSet, ArtifactStore, ArtifactWriter};
pub use classify::{Category, ContentClassifier, ExtractedBlock};
pub use config::{ConfigError, DemoforgeConfig};
pub use generation::{Generation, GenerationErrorKind, GenerationPort, LlmGenerationPort};
pub use llm::{BackendError, GenAIClient, LLMClient, MockLLMClient};
pub use progress::{EventStatus, ProgressHandler, WorkflowEvent};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::{ValidationReport, Validator};
pub use workflow::{Stage, WorkflowConfig, WorkflowEngine, WorkflowError, WorkflowState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_demoforge() {
        assert_eq!(NAME, "demoforge");
    }
}
