//! Text generation collaborator
//!
//! The engine only sees [`GenerationPort`]; [`LlmGenerationPort`] adapts any
//! [`crate::llm::LLMClient`] to it and owns prompt construction and the
//! optional transcript.

mod llm_port;
mod port;
mod prompt;
mod transcript;

pub use llm_port::LlmGenerationPort;
pub use port::{Generation, GenerationErrorKind, GenerationPort, PhaseContext};
pub use prompt::PromptBuilder;
pub use transcript::{Exchange, TranscriptLogger};
