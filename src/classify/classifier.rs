use super::segment::{segment, Delimiter};
use super::signals::{CodeSignals, Signal};
use super::vocabulary::{CategoryVocabulary, CATEGORY_VOCABULARIES};
use crate::artifact::ArtifactCategory;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, trace};

/// Block-level category; `Unclassified` never reaches the artifact layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Classified(ArtifactCategory),
    Unclassified,
}

impl Category {
    pub fn artifact(&self) -> Option<ArtifactCategory> {
        match self {
            Category::Classified(category) => Some(*category),
            Category::Unclassified => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Classified(category) => category.as_str(),
            Category::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A code-like span recovered from model output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedBlock {
    /// The span exactly as it appeared between its delimiters
    pub text: String,
    pub category: Category,
    pub signals: BTreeSet<Signal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub delimiter: Delimiter,
}

/// Recovers categorized code spans from free-form text
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    vocabularies: Vec<CategoryVocabulary>,
}

impl ContentClassifier {
    pub fn new() -> Self {
        Self::with_vocabularies(CATEGORY_VOCABULARIES.to_vec())
    }

    /// Uses a custom table; row order is the priority order
    pub fn with_vocabularies(vocabularies: Vec<CategoryVocabulary>) -> Self {
        Self { vocabularies }
    }

    /// Extracts qualifying blocks in the order they appear in `raw`.
    ///
    /// Never fails: malformed or prose-only input yields an empty vector.
    pub fn extract(&self, raw: &str) -> Vec<ExtractedBlock> {
        let blocks: Vec<ExtractedBlock> = segment(raw)
            .into_iter()
            .filter_map(|candidate| {
                let signals = CodeSignals::analyze(&candidate.text, candidate.language.as_deref());
                let qualifies = match candidate.delimiter {
                    Delimiter::Bare => signals.qualifies_bare(),
                    Delimiter::Fenced | Delimiter::Inline => signals.qualifies(),
                };
                if !qualifies {
                    trace!(
                        delimiter = ?candidate.delimiter,
                        len = candidate.text.len(),
                        "Candidate span is not code-like"
                    );
                    return None;
                }

                let mut signal_set = signals.to_signal_set(candidate.language.as_deref());
                let (category, term) = self.categorize(&candidate.text);
                if let Some(term) = term {
                    signal_set.insert(Signal::Vocabulary(term));
                }

                Some(ExtractedBlock {
                    text: candidate.text,
                    category,
                    signals: signal_set,
                    language: candidate.language,
                    delimiter: candidate.delimiter,
                })
            })
            .collect();

        debug!(
            blocks = blocks.len(),
            unclassified = blocks
                .iter()
                .filter(|b| b.category == Category::Unclassified)
                .count(),
            "Extracted code blocks"
        );
        blocks
    }

    /// Category for an already isolated span of text
    pub fn classify(&self, text: &str) -> Category {
        self.categorize(text).0
    }

    fn categorize(&self, text: &str) -> (Category, Option<&'static str>) {
        self.vocabularies
            .iter()
            .find_map(|vocabulary| {
                vocabulary
                    .find_match(text)
                    .map(|term| (Category::Classified(vocabulary.category), Some(term)))
            })
            .unwrap_or((Category::Unclassified, None))
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
