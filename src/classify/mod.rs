//! Content classification
//!
//! Recovers code-like spans from unstructured model output and assigns each
//! one an artifact category. Segmentation, scoring and categorization are
//! separate steps so the vocabulary table can be tested and extended on its own.

mod classifier;
mod segment;
mod signals;
mod vocabulary;

pub use classifier::{Category, ContentClassifier, ExtractedBlock};
pub use segment::{segment, Candidate, Delimiter};
pub use signals::{contains_term, CodeSignals, Signal};
pub use vocabulary::{CategoryVocabulary, CATEGORY_VOCABULARIES};
