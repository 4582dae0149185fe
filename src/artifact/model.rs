use super::category::ArtifactCategory;
use crate::classify::{Delimiter, ExtractedBlock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A finished, named unit of content ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub category: ArtifactCategory,
    /// Relative path, always `{category}/{filename}`
    pub path: String,
    pub content: String,
}

impl Artifact {
    pub fn new(category: ArtifactCategory, filename: &str, content: impl Into<String>) -> Self {
        Self {
            category,
            path: format!("{}/{}", category.dir(), filename),
            content: content.into(),
        }
    }

    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.filename();
        name.rfind('.').map(|idx| &name[idx + 1..])
    }
}

/// Path-keyed artifact collection with deterministic iteration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactSet {
    artifacts: BTreeMap<String, Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the artifact at the same path
    pub fn insert(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.path.clone(), artifact);
    }

    pub fn extend(&mut self, artifacts: impl IntoIterator<Item = Artifact>) {
        for artifact in artifacts {
            self.insert(artifact);
        }
    }

    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    pub fn paths(&self) -> Vec<String> {
        self.artifacts.keys().cloned().collect()
    }

    pub fn by_category(&self, category: ArtifactCategory) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values().filter(move |a| a.category == category)
    }

    /// True if the category has at least one file with content
    pub fn has_category(&self, category: ArtifactCategory) -> bool {
        self.by_category(category).any(|a| !a.content.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// One classified span routed to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Came from a single-backtick span inside prose
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            inline: false,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }
}

impl From<&ExtractedBlock> for Fragment {
    fn from(block: &ExtractedBlock) -> Self {
        Self {
            text: block.text.clone(),
            language: block.language.clone(),
            inline: block.delimiter == Delimiter::Inline,
        }
    }
}

/// Classified text grouped by category, in extraction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedText {
    fragments: BTreeMap<ArtifactCategory, Vec<Fragment>>,
}

impl CategorizedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: ArtifactCategory, fragment: Fragment) {
        if fragment.text.trim().is_empty() {
            return;
        }
        self.fragments.entry(category).or_default().push(fragment);
    }

    /// Routes each block by its own category; unclassified blocks are skipped
    pub fn route_blocks(&mut self, blocks: &[ExtractedBlock]) {
        for block in blocks {
            if let Some(category) = block.category.artifact() {
                self.push(category, Fragment::from(block));
            }
        }
    }

    /// Folds every block into one category regardless of its classification
    pub fn absorb_blocks(&mut self, category: ArtifactCategory, blocks: &[ExtractedBlock]) {
        for block in blocks {
            self.push(category, Fragment::from(block));
        }
    }

    pub fn fragments(&self, category: ArtifactCategory) -> &[Fragment] {
        self.fragments
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fragments of a category joined by blank lines
    pub fn joined(&self, category: ArtifactCategory) -> String {
        join_fragments(self.fragments(category))
    }

    pub fn is_empty(&self, category: ArtifactCategory) -> bool {
        self.fragments(category).is_empty()
    }

    /// Concatenated text per non-empty category
    pub fn to_text_map(&self) -> BTreeMap<ArtifactCategory, String> {
        self.fragments
            .keys()
            .map(|category| (*category, self.joined(*category)))
            .collect()
    }
}

pub(crate) fn join_fragments(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
