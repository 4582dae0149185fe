use crate::artifact::{ArtifactCategory, ArtifactSet};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, artifacts: &ArtifactSet) -> Result<()>;
}

pub struct RequiredCategoriesRule;

impl ValidationRule for RequiredCategoriesRule {
    fn name(&self) -> &'static str {
        "RequiredCategories"
    }

    fn validate(&self, artifacts: &ArtifactSet) -> Result<()> {
        let missing: Vec<&str> = ArtifactCategory::ALL
            .iter()
            .filter(|c| !artifacts.has_category(**c))
            .map(|c| c.as_str())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("Missing artifacts for: {}", missing.join(", "));
        }
        Ok(())
    }
}

const MARKUP_EXTENSIONS: &[&str] = &["html", "htm"];
const ASSET_EXTENSIONS: &[&str] = &["css", "js"];

/// Paired tags a markup document must balance, root first
const STRUCTURAL_TAGS: &[&str] = &["html", "head", "body"];

fn tag_regexes() -> &'static [(Regex, Regex)] {
    static TAGS: OnceLock<Vec<(Regex, Regex)>> = OnceLock::new();
    TAGS.get_or_init(|| {
        STRUCTURAL_TAGS
            .iter()
            .map(|tag| {
                (
                    Regex::new(&format!(r"(?i)<{}[\s>]", tag)).expect("Invalid open tag regex"),
                    Regex::new(&format!(r"(?i)</{}\s*>", tag)).expect("Invalid close tag regex"),
                )
            })
            .collect()
    })
}

pub struct MarkupStructureRule;

impl ValidationRule for MarkupStructureRule {
    fn name(&self) -> &'static str {
        "MarkupStructure"
    }

    fn validate(&self, artifacts: &ArtifactSet) -> Result<()> {
        let markup: Vec<_> = artifacts
            .by_category(ArtifactCategory::Frontend)
            .filter(|a| a.extension().is_some_and(|ext| MARKUP_EXTENSIONS.contains(&ext)))
            .collect();

        if markup.is_empty() {
            anyhow::bail!("Frontend has no markup entry point (index.html)");
        }

        for artifact in markup {
            for (tag, (open, close)) in STRUCTURAL_TAGS.iter().zip(tag_regexes()) {
                let opened = open.find_iter(&artifact.content).count();
                let closed = close.find_iter(&artifact.content).count();
                if *tag == "html" && (opened == 0 || closed == 0) {
                    anyhow::bail!("{} is missing its <html>...</html> root", artifact.path);
                }
                if opened != closed {
                    anyhow::bail!(
                        "{} has unpaired <{}> tags ({} opened, {} closed)",
                        artifact.path,
                        tag,
                        opened,
                        closed
                    );
                }
            }
        }
        Ok(())
    }
}

pub struct NonEmptyAssetsRule;

impl ValidationRule for NonEmptyAssetsRule {
    fn name(&self) -> &'static str {
        "NonEmptyAssets"
    }

    fn validate(&self, artifacts: &ArtifactSet) -> Result<()> {
        let empty: Vec<&str> = artifacts
            .iter()
            .filter(|a| a.extension().is_some_and(|ext| ASSET_EXTENSIONS.contains(&ext)))
            .filter(|a| a.content.trim().is_empty())
            .map(|a| a.path.as_str())
            .collect();
        if !empty.is_empty() {
            anyhow::bail!("Empty stylesheet or script: {}", empty.join(", "));
        }
        Ok(())
    }
}
